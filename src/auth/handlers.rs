use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, CreateUserRequest, LoginRequest, PublicUser},
        jwt::{AuthUser, JwtKeys},
        password,
        repo::InsertUserError,
        repo_types::User,
    },
    error::ApiError,
    state::AppState,
    validate::Validator,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/createuser", post(create_user))
        .route("/login", post(login))
        .route("/getuser", post(get_user))
}

/// POST /createuser — register a new user, no login required.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let mut v = Validator::new();
    v.length(
        "name",
        &payload.name,
        2,
        25,
        "name must be between 2 and 25 characters",
    )
    .email("email", &payload.email, "enter a valid email")
    .length(
        "password",
        &payload.password,
        5,
        20,
        "password must be between 5 and 20 characters",
    )
    .equals(
        "cpassword",
        &payload.cpassword,
        &payload.password,
        "entered passwords do not match",
    );
    v.finish().map_err(ApiError::Validation)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = password::hash_password_blocking(payload.password).await?;

    let user = match User::create(&state.db, &payload.name, &payload.email, &hash).await {
        Ok(u) => u,
        // Lost the check-then-insert race; the unique index decides
        Err(InsertUserError::DuplicateEmail) => {
            warn!(email = %payload.email, "concurrent registration for email");
            return Err(ApiError::DuplicateEmail);
        }
        Err(InsertUserError::Db(e)) => return Err(anyhow::Error::from(e).into()),
    };

    let keys = JwtKeys::from_ref(&state);
    let authtoken = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            authtoken,
        }),
    ))
}

/// POST /login — exchange credentials for a token, no login required.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let mut v = Validator::new();
    v.email("email", &payload.email, "enter a valid email")
        .required("password", &payload.password, "password cannot be blank");
    v.finish().map_err(ApiError::Validation)?;

    // Unknown email and wrong password produce the same response so the
    // endpoint does not reveal which emails are registered.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let ok = password::verify_password_blocking(payload.password, user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let authtoken = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        authtoken,
    }))
}

/// POST /getuser — current user's record, token required. A valid token
/// whose user has since vanished yields a 200 null body.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Option<PublicUser>>, ApiError> {
    let user = User::find_by_id(&state.db, user_id).await?;
    if user.is_none() {
        warn!(user_id = %user_id, "token user no longer exists");
    }
    Ok(Json(user.map(PublicUser::from)))
}
