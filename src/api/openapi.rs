//! OpenAPI document assembled from `#[utoipa::path]` annotations.
//!
//! Register new endpoints in `paths(...)` here as well as in the router so
//! they are both served and documented; Swagger UI reads the result at
//! `/docs`.

use utoipa::OpenApi;

use super::handlers::{auth, health, posts, profile, users};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register::register,
        auth::login::login,
        auth::session::session,
        auth::session::logout,
        auth::federated::federated_sign_in,
        profile::setup_profile,
        profile::check_handle,
        posts::list_posts,
        posts::create_post,
        posts::get_post,
        users::user_profile,
        users::follow_user,
        users::unfollow_user,
    ),
    components(schemas(
        health::Health,
        auth::types::RegisterRequest,
        auth::types::RegisterResponse,
        auth::types::LoginRequest,
        auth::types::IdentityResponse,
        auth::types::FederatedSignInRequest,
        auth::types::SessionResponse,
        profile::ProfileSetupRequest,
        profile::ProfileSetupResponse,
        profile::CheckHandleResponse,
        posts::types::CreatePostRequest,
        posts::types::PostResponse,
        posts::types::PostsResponse,
        users::types::UserSummary,
        users::types::UserProfileResponse,
        users::types::FollowResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, sessions, and federated sign-in"),
        (name = "profile", description = "One-time profile setup"),
        (name = "posts", description = "Publishing and reading posts"),
        (name = "users", description = "Public profiles and the follow graph"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
