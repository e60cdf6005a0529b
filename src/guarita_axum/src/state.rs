use guarita_application::{
    CompleteTwoFactorUseCase, LoginUseCase, LogoutUseCase, PasswordResetFlow, TokenIssuer,
    ToggleTwoFactorUseCase,
};
use guarita_core::{AccountStore, CredentialHasher, EmailDispatcher, EventStore, TokenCodec};

/// One state object shared by every route. The stores and clients it wraps
/// are cheap to clone (Arc-backed handles or small keys), so each use case
/// gets its own handle.
#[derive(Clone)]
pub struct AppState<A, S, H, C, D>
where
    A: AccountStore + Clone,
    S: EventStore + Clone,
    H: CredentialHasher + Clone,
    C: TokenCodec + Clone,
    D: EmailDispatcher + Clone,
{
    pub login: LoginUseCase<A, S, H, C, D>,
    pub complete_two_factor: CompleteTwoFactorUseCase<A, S, C, D>,
    pub logout: LogoutUseCase<S, C>,
    pub toggle_two_factor: ToggleTwoFactorUseCase<S, D>,
    pub password_reset: PasswordResetFlow<A, S, H, D>,
    pub token_issuer: TokenIssuer<S, C>,
}

impl<A, S, H, C, D> AppState<A, S, H, C, D>
where
    A: AccountStore + Clone,
    S: EventStore + Clone,
    H: CredentialHasher + Clone,
    C: TokenCodec + Clone,
    D: EmailDispatcher + Clone,
{
    pub fn new(accounts: A, events: S, hasher: H, codec: C, mailer: D) -> Self {
        Self {
            login: LoginUseCase::new(
                accounts.clone(),
                events.clone(),
                hasher.clone(),
                codec.clone(),
                mailer.clone(),
            ),
            complete_two_factor: CompleteTwoFactorUseCase::new(
                accounts.clone(),
                events.clone(),
                codec.clone(),
                mailer.clone(),
            ),
            logout: LogoutUseCase::new(events.clone(), codec.clone()),
            toggle_two_factor: ToggleTwoFactorUseCase::new(events.clone(), mailer.clone()),
            password_reset: PasswordResetFlow::new(accounts, events.clone(), hasher, mailer),
            token_issuer: TokenIssuer::new(events, codec),
        }
    }
}
