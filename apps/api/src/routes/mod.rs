pub mod health;

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::cors::cors;
use crate::dashboard::handlers as dashboard;
use crate::functions::{
    mentor_activities, mentor_follow, profile_analysis, progress_analysis,
    recommendations as generate,
};
use crate::goals::handlers as goals;
use crate::mentors::handlers as mentors;
use crate::profile::handlers as profile;
use crate::recommendations::handlers as recommendations;
use crate::routing::handle_navigation;
use crate::session::{handle_session, handle_sign_out};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session and navigation
        .route("/api/v1/session", get(handle_session).delete(handle_sign_out))
        .route("/api/v1/navigation", get(handle_navigation))
        // Profile and onboarding
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).put(profile::handle_save_profile),
        )
        .route("/api/v1/setup", post(profile::handle_complete_setup))
        .route("/api/v1/setup/options", get(profile::handle_setup_options))
        // Goals
        .route(
            "/api/v1/goals",
            get(goals::handle_list_goals).post(goals::handle_create_goal),
        )
        .route(
            "/api/v1/goals/:id",
            put(goals::handle_update_goal).delete(goals::handle_delete_goal),
        )
        .route("/api/v1/goals/:id/status", patch(goals::handle_change_status))
        .route("/api/v1/goals/:id/progress", patch(goals::handle_set_progress))
        // Dashboard views
        .route("/api/v1/dashboard", get(dashboard::handle_dashboard))
        .route("/api/v1/progress", get(dashboard::handle_progress))
        // Recommendations and mentors
        .route(
            "/api/v1/recommendations",
            get(recommendations::handle_list_recommendations),
        )
        .route(
            "/api/v1/recommendations/:id/goal",
            post(recommendations::handle_add_as_goal),
        )
        .route("/api/v1/mentors", get(mentors::handle_list_mentors))
        // Functions
        .route(
            "/functions/v1/mentor-follow",
            post(mentor_follow::handle_mentor_follow),
        )
        .route(
            "/functions/v1/mentor-activities",
            get(mentor_activities::handle_mentor_activities)
                .post(mentor_activities::handle_mentor_activities),
        )
        .route(
            "/functions/v1/personalized-recommendations",
            post(generate::handle_personalized_recommendations),
        )
        .route(
            "/functions/v1/progress-analysis",
            post(progress_analysis::handle_progress_analysis),
        )
        .route(
            "/functions/v1/user-profile-analysis",
            post(profile_analysis::handle_profile_analysis),
        )
        .layer(middleware::from_fn(cors))
        .with_state(state)
}
