use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{categories, memberships, session, token::TokenKeys, user, vault};
use engine::{Engine, UserError};

/// Runtime switches of the HTTP surface.
#[derive(Clone)]
pub struct ServerConfig {
    /// When off, `/register` is not routed and answers `404`.
    pub enable_register: bool,
    /// HS256 secret for access tokens.
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: Arc<TokenKeys>,
}

/// Resolve the caller from a Bearer token and attach the `engine::User` to
/// the request.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims = state.tokens.verify(auth_header.token()).map_err(|err| {
        tracing::debug!("rejected token: {err}");
        StatusCode::UNAUTHORIZED
    })?;

    let user = state
        .engine
        .users()
        .find_one_by_id(&claims.sub)
        .await
        .map_err(|err| match err {
            UserError::NotFound(_) => StatusCode::UNAUTHORIZED,
            err => {
                tracing::error!("failed to load token subject: {err}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(engine: Engine, config: ServerConfig) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        tokens: Arc::new(TokenKeys::new(config.jwt_secret.as_bytes())),
    };

    let protected = Router::new()
        .route("/user", get(user::current))
        .route("/users", get(user::list))
        .route("/users/{id}", get(user::get))
        .route("/vaults", post(vault::vault_new).get(vault::list))
        .route("/vaults/{vault_id}", get(vault::get).delete(vault::delete))
        .route("/vaults/{vault_id}/users", post(memberships::add_user))
        .route("/vaults/{vault_id}/active", put(vault::set_active))
        .route(
            "/vaults/{vault_id}/expense-categories",
            get(categories::list),
        )
        .route("/expense-categories", post(categories::create))
        .route(
            "/expense-categories/{id}",
            get(categories::get).patch(categories::update),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    let mut public = Router::new()
        .route("/health-check", get(session::health_check))
        .route("/login", post(session::login));
    if config.enable_register {
        public = public.route("/register", post(session::register));
    }

    public.merge(protected).with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine, config)).await
}
