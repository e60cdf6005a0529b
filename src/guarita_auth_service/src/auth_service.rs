use axum::{
    Router,
    http::{HeaderValue, Method, request},
    routing::{get, post},
};
use guarita_adapters::config::AllowedOrigins;
use guarita_axum::{
    AppState,
    routes::{
        login, logout, redeem_password_reset, request_password_reset, toggle_2fa, verify_2fa,
        verify_reset_ticket, verify_token,
    },
};
use guarita_core::{AccountStore, CredentialHasher, EmailDispatcher, EventStore, TokenCodec};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// The authentication service: every `/auth/*` route wired to one shared
/// state.
pub struct AuthService {
    router: Router,
}

impl AuthService {
    /// Assemble the router over the given adapters.
    ///
    /// Stores and clients implement Clone via internal Arc-backed handles,
    /// so one [`AppState`] is shared across all routes.
    pub fn new<A, S, H, C, D>(accounts: A, events: S, hasher: H, codec: C, mailer: D) -> Self
    where
        A: AccountStore + Clone + 'static,
        S: EventStore + Clone + 'static,
        H: CredentialHasher + Clone + 'static,
        C: TokenCodec + Clone + 'static,
        D: EmailDispatcher + Clone + 'static,
    {
        let state = AppState::new(accounts, events, hasher, codec, mailer);

        let router = Router::new()
            .route("/auth/login", post(login::<A, S, H, C, D>))
            .route("/auth/verify-2fa", post(verify_2fa::<A, S, H, C, D>))
            .route(
                "/auth/request-password-reset",
                post(request_password_reset::<A, S, H, C, D>),
            )
            .route(
                "/auth/verify-reset-ticket",
                get(verify_reset_ticket::<A, S, H, C, D>),
            )
            .route(
                "/auth/redeem-password-reset",
                post(redeem_password_reset::<A, S, H, C, D>),
            )
            .route("/auth/logout", post(logout::<A, S, H, C, D>))
            .route("/auth/toggle-2fa", post(toggle_2fa::<A, S, H, C, D>))
            .route("/auth/verify-token", post(verify_token::<A, S, H, C, D>))
            .with_state(state);

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Convert into a router that can be nested into a larger application.
    pub fn into_router(mut self, allowed_origins: Option<AllowedOrigins>) -> Router {
        if let Some(allowed_origins) = allowed_origins {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        allowed_origins.contains_bytes(origin.as_bytes())
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Run as a standalone server on the given listener.
    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<AllowedOrigins>,
    ) -> Result<(), std::io::Error> {
        let router = self.into_router(allowed_origins);

        tracing::info!("Auth service listening on {}", listener.local_addr()?);

        axum::serve(listener, router).await
    }
}
