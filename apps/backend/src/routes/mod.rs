use actix_web::web;

pub mod admin;
pub mod health;
pub mod players;
pub mod realtime;

/// Register every route. `main.rs` and the route tests share this so the
/// tests exercise the same paths the server exposes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes);

    // Operator routes: /api/admin/**
    cfg.service(web::scope("/api/admin").configure(admin::configure_routes));

    // Player routes: /api/sessions/**, /api/players/**, /api/answers
    cfg.service(web::scope("/api").configure(players::configure_routes));

    // Persistent connections: /ws
    cfg.configure(realtime::configure_routes);
}
