/**
 * API Routes
 *
 * This module defines the REST routes of the server:
 * - Public authentication endpoints (signup, login)
 * - Protected endpoints behind the bearer-token middleware (everything else)
 *
 * # Path Parameters
 *
 * Parameter names are shared by every route that nests under the same
 * prefix: `project_id`, `board_id`, `column_id`, `card_id`, `user_id`.
 */

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};

use crate::backend::auth::{get_me, link_provider, login, logout, signup, unlink_provider};
use crate::backend::calendar::sync_calendar;
use crate::backend::export::export_pdf;
use crate::backend::middleware::auth_middleware;
use crate::backend::notifications::{list_notifications, mark_all_read, mark_read};
use crate::backend::projects::{boards, cards, columns, comments, handlers, members};
use crate::backend::realtime::handle_project_subscription;
use crate::backend::server::state::AppState;

/// Routes reachable without a token
///
/// - `POST /auth/signup` - User registration
/// - `POST /auth/login` - User login
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

/// Routes that require `Authorization: Bearer <jwt>`
///
/// The auth middleware is attached with `route_layer`, so unknown paths
/// still fall through to the 404 handler instead of answering 401.
pub fn protected_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        // Session
        .route("/auth/me", get(get_me))
        .route("/auth/logout", post(logout))
        .route(
            "/auth/providers/{provider}",
            put(link_provider).delete(unlink_provider),
        )
        // Projects
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{project_id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route("/projects/{project_id}/events", get(handle_project_subscription))
        .route("/projects/{project_id}/export/pdf", get(export_pdf))
        .route("/projects/{project_id}/calendar/sync", post(sync_calendar))
        // Members
        .route(
            "/projects/{project_id}/members",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/projects/{project_id}/members/transfer",
            post(members::transfer_ownership),
        )
        .route(
            "/projects/{project_id}/members/{user_id}",
            patch(members::update_member).delete(members::remove_member),
        )
        // Boards
        .route(
            "/projects/{project_id}/boards",
            get(boards::list_boards).post(boards::create_board),
        )
        .route(
            "/projects/{project_id}/boards/{board_id}",
            put(boards::update_board).delete(boards::delete_board),
        )
        // Columns
        .route(
            "/projects/{project_id}/boards/{board_id}/columns",
            post(columns::create_column),
        )
        .route(
            "/projects/{project_id}/boards/{board_id}/columns/{column_id}",
            put(columns::update_column).delete(columns::delete_column),
        )
        // Cards
        .route(
            "/projects/{project_id}/boards/{board_id}/columns/{column_id}/cards",
            post(cards::create_card),
        )
        .route(
            "/projects/{project_id}/boards/{board_id}/columns/{column_id}/cards/{card_id}",
            put(cards::update_card).delete(cards::delete_card),
        )
        .route(
            "/projects/{project_id}/boards/{board_id}/columns/{column_id}/cards/{card_id}/comments",
            post(comments::create_comment),
        )
        .route(
            "/projects/{project_id}/boards/{board_id}/cards/{card_id}/move",
            put(cards::move_card_handler),
        )
        // Notifications
        .route("/notifications", get(list_notifications))
        .route("/notifications/read-all", put(mark_all_read))
        .route("/notifications/{notification_id}/read", put(mark_read))
        .route_layer(from_fn_with_state(app_state, auth_middleware))
}

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
/// * `app_state` - State handed to the auth middleware
///
/// # Returns
///
/// Router with public and protected API routes merged in
pub fn configure_api_routes(router: Router<AppState>, app_state: AppState) -> Router<AppState> {
    router
        .merge(public_routes())
        .merge(protected_routes(app_state))
}
