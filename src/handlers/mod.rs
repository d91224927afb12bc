// HTTP handlers for the users API

pub mod users;

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

// User routes, mounted at /users
pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::register))
        .route("/login", post(users::login))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user)
                .patch(users::toggle_business),
        )
}
