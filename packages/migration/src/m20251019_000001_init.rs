use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKey, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    JoinCode,
    Status,
    QuestionsPerRound,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Questions {
    Table,
    Id,
    Text,
    OptionA,
    OptionB,
    OptionC,
    OptionD,
    CorrectOption,
    Used,
}

#[derive(Iden)]
enum Prizes {
    Table,
    Id,
    Name,
    PrizeType,
    InitialUnits,
    RemainingUnits,
    Priority,
}

#[derive(Iden)]
enum Players {
    Table,
    Id,
    SessionId,
    Name,
    Active,
    PrizeWon,
    CreatedAt,
}

#[derive(Iden)]
enum Rounds {
    Table,
    Id,
    SessionId,
    RoundNo,
    Completed,
    WinnerPlayerId,
    PrizeId,
    PrizeAwarded,
    CreatedAt,
    CompletedAt,
}

#[derive(Iden)]
enum RoundQuestions {
    Table,
    Id,
    RoundId,
    Position,
    QuestionId,
}

#[derive(Iden)]
enum PlayerAnswers {
    Table,
    Id,
    PlayerId,
    RoundId,
    QuestionId,
    GivenOption,
    IsCorrect,
    CreatedAt,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .primary_key()
        .auto_increment()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // sessions
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(id_col(Sessions::Id))
                    .col(ColumnDef::new(Sessions::JoinCode).string().not_null())
                    .col(
                        ColumnDef::new(Sessions::Status)
                            .string()
                            .not_null()
                            .default("waiting"),
                    )
                    .col(
                        ColumnDef::new(Sessions::QuestionsPerRound)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(
                        ColumnDef::new(Sessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_sessions_join_code")
                    .table(Sessions::Table)
                    .col(Sessions::JoinCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // questions (catalog)
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(id_col(Questions::Id))
                    .col(ColumnDef::new(Questions::Text).text().not_null())
                    .col(ColumnDef::new(Questions::OptionA).string().not_null())
                    .col(ColumnDef::new(Questions::OptionB).string().not_null())
                    .col(ColumnDef::new(Questions::OptionC).string().not_null())
                    .col(ColumnDef::new(Questions::OptionD).string().not_null())
                    .col(ColumnDef::new(Questions::CorrectOption).string().not_null())
                    .col(
                        ColumnDef::new(Questions::Used)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // prizes (catalog)
        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(id_col(Prizes::Id))
                    .col(ColumnDef::new(Prizes::Name).string().not_null())
                    .col(ColumnDef::new(Prizes::PrizeType).string().not_null())
                    .col(ColumnDef::new(Prizes::InitialUnits).integer().not_null())
                    .col(ColumnDef::new(Prizes::RemainingUnits).integer().not_null())
                    .col(ColumnDef::new(Prizes::Priority).integer().not_null())
                    .check(Expr::col(Prizes::RemainingUnits).gte(0))
                    .to_owned(),
            )
            .await?;

        // players
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(id_col(Players::Id))
                    .col(ColumnDef::new(Players::SessionId).big_integer().not_null())
                    .col(ColumnDef::new(Players::Name).string().not_null())
                    .col(
                        ColumnDef::new(Players::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Players::PrizeWon).string().null())
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_session")
                            .from(Players::Table, Players::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_players_session_name")
                    .table(Players::Table)
                    .col(Players::SessionId)
                    .col(Players::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // rounds
        manager
            .create_table(
                Table::create()
                    .table(Rounds::Table)
                    .if_not_exists()
                    .col(id_col(Rounds::Id))
                    .col(ColumnDef::new(Rounds::SessionId).big_integer().not_null())
                    .col(ColumnDef::new(Rounds::RoundNo).integer().not_null())
                    .col(
                        ColumnDef::new(Rounds::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Rounds::WinnerPlayerId).big_integer().null())
                    .col(ColumnDef::new(Rounds::PrizeId).big_integer().null())
                    .col(ColumnDef::new(Rounds::PrizeAwarded).string().null())
                    .col(
                        ColumnDef::new(Rounds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rounds_session")
                            .from(Rounds::Table, Rounds::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rounds_winner")
                            .from(Rounds::Table, Rounds::WinnerPlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_rounds_session_round_no")
                    .table(Rounds::Table)
                    .col(Rounds::SessionId)
                    .col(Rounds::RoundNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // round_questions: ordered question ids of a round
        manager
            .create_table(
                Table::create()
                    .table(RoundQuestions::Table)
                    .if_not_exists()
                    .col(id_col(RoundQuestions::Id))
                    .col(ColumnDef::new(RoundQuestions::RoundId).big_integer().not_null())
                    .col(ColumnDef::new(RoundQuestions::Position).integer().not_null())
                    .col(
                        ColumnDef::new(RoundQuestions::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_round_questions_round")
                            .from(RoundQuestions::Table, RoundQuestions::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_round_questions_question")
                            .from(RoundQuestions::Table, RoundQuestions::QuestionId)
                            .to(Questions::Table, Questions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_round_questions_round_position")
                    .table(RoundQuestions::Table)
                    .col(RoundQuestions::RoundId)
                    .col(RoundQuestions::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // player_answers
        manager
            .create_table(
                Table::create()
                    .table(PlayerAnswers::Table)
                    .if_not_exists()
                    .col(id_col(PlayerAnswers::Id))
                    .col(ColumnDef::new(PlayerAnswers::PlayerId).big_integer().not_null())
                    .col(ColumnDef::new(PlayerAnswers::RoundId).big_integer().not_null())
                    .col(
                        ColumnDef::new(PlayerAnswers::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlayerAnswers::GivenOption).string().not_null())
                    .col(ColumnDef::new(PlayerAnswers::IsCorrect).boolean().not_null())
                    .col(
                        ColumnDef::new(PlayerAnswers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_answers_player")
                            .from(PlayerAnswers::Table, PlayerAnswers::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_answers_round")
                            .from(PlayerAnswers::Table, PlayerAnswers::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_player_answers_player_round_question")
                    .table(PlayerAnswers::Table)
                    .col(PlayerAnswers::PlayerId)
                    .col(PlayerAnswers::RoundId)
                    .col(PlayerAnswers::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayerAnswers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoundQuestions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rounds::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prizes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Questions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
