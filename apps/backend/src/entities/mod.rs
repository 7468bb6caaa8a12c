pub mod player_answers;
pub mod players;
pub mod prizes;
pub mod questions;
pub mod round_questions;
pub mod rounds;
pub mod sessions;

pub use player_answers::Entity as PlayerAnswers;
pub use player_answers::Model as PlayerAnswer;
pub use players::Entity as Players;
pub use players::Model as Player;
pub use prizes::Entity as Prizes;
pub use prizes::Model as Prize;
pub use questions::Entity as Questions;
pub use questions::Model as Question;
pub use round_questions::Entity as RoundQuestions;
pub use round_questions::Model as RoundQuestion;
pub use rounds::Entity as Rounds;
pub use rounds::Model as Round;
pub use sessions::Entity as Sessions;
pub use sessions::Model as Session;
