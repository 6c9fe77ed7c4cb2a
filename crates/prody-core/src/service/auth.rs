//! Auth flows: signup, verification, sign-in, password reset, federated
//! login, token refresh.
//!
//! Accounts move `Unverified -> Verified` exactly once, through a one-time
//! code. Every security-relevant transition lands in the activity log.

use std::sync::Arc;

use prody_auth::model::REFRESH_THRESHOLD_SECONDS;
use prody_auth::service::password::{hash_password, verify_password};
use prody_auth::{GoogleProfile, GoogleVerifier, TokenService};
use prody_common::utils::{full_name, generate_otp, generate_reset_token};
use prody_common::{OTP_EXPIRY_MINUTES, ProdyError, RESET_TOKEN_EXPIRY_MINUTES, ROLE_MEMBER};
use prody_persistence::entity::users;
use prody_persistence::new_entity_id;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::warn;

use crate::model::{AuthResponse, RefreshOutcome, UserSummary};
use crate::service::activity_log::ActivityLogService;
use crate::service::mail::MailService;

/// Neutral response for forgot-password, identical whether or not the
/// account exists
const RESET_REQUESTED_MESSAGE: &str = "If an account exists, a reset link has been sent.";

#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    tokens: TokenService,
    mail: MailService,
    google: Arc<GoogleVerifier>,
    activity: ActivityLogService,
}

impl AuthService {
    pub fn new(
        db: DatabaseConnection,
        tokens: TokenService,
        mail: MailService,
        google: Arc<GoogleVerifier>,
        activity: ActivityLogService,
    ) -> Self {
        Self {
            db,
            tokens,
            mail,
            google,
            activity,
        }
    }

    /// Create an Unverified account and send its one-time code.
    ///
    /// The account write and its audit entry are one unit of work; the OTP
    /// mail is sent after commit and its failure only changes the response
    /// message - the holder can request a resend.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: Option<&str>,
    ) -> anyhow::Result<String> {
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ProdyError::Conflict("User already registered".to_string()).into());
        }

        let password_hash = hash_password(password)?;
        let otp = generate_otp();
        let otp_expires = chrono::Utc::now() + chrono::Duration::minutes(OTP_EXPIRY_MINUTES);
        let now = chrono::Utc::now();

        let tx = self.db.begin().await?;

        let user = users::ActiveModel {
            id: Set(new_entity_id()),
            email: Set(email.to_string()),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.map(str::to_string)),
            full_name: Set(full_name(first_name, last_name)),
            password_hash: Set(password_hash),
            avatar_url: Set(None),
            role: Set(ROLE_MEMBER.to_string()),
            organization_id: Set(None),
            is_email_verified: Set(false),
            verification_otp: Set(Some(otp.clone())),
            otp_expires: Set(Some(otp_expires)),
            reset_token: Set(None),
            reset_token_exp: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&tx)
        .await?;

        self.activity
            .record(&tx, &user.id, "USER_SIGNUP_INITIATED", "Auth", Some(&user.id), None)
            .await?;

        tx.commit().await?;

        match self.mail.send_otp(email, &otp).await {
            Ok(()) => Ok("OTP sent to your email".to_string()),
            Err(e) => {
                warn!(email, "failed to send signup OTP: {}", e);
                Ok("Account created. Please request OTP if not received.".to_string())
            }
        }
    }

    /// Issue a fresh one-time code for a still-unverified account.
    ///
    /// Here a mail failure blocks the whole point of the call, so it is
    /// surfaced instead of swallowed.
    pub async fn resend_otp(&self, email: &str) -> anyhow::Result<String> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| ProdyError::NotFound("User not found".to_string()))?;
        if user.is_email_verified {
            return Err(ProdyError::InvalidInput("Email already verified".to_string()).into());
        }

        let otp = generate_otp();
        let otp_expires = chrono::Utc::now() + chrono::Duration::minutes(OTP_EXPIRY_MINUTES);

        let mut active: users::ActiveModel = user.into();
        active.verification_otp = Set(Some(otp.clone()));
        active.otp_expires = Set(Some(otp_expires));
        active.updated_at = Set(chrono::Utc::now());
        active.update(&self.db).await?;

        if let Err(e) = self.mail.send_otp(email, &otp).await {
            warn!(email, "failed to resend OTP: {}", e);
            return Err(ProdyError::DependencyFailure(
                "Failed to send OTP. Please try again later.".to_string(),
            )
            .into());
        }

        Ok("New OTP sent to your email".to_string())
    }

    /// Consume a one-time code and transition the account to Verified.
    ///
    /// Mismatch and expiry are indistinguishable to the caller.
    pub async fn verify_email(&self, email: &str, otp: &str) -> anyhow::Result<AuthResponse> {
        let now = chrono::Utc::now();

        // Mismatch, expiry and unknown account all look the same to the caller
        let user = match self.find_by_email(email).await? {
            Some(u)
                if u.verification_otp.as_deref() == Some(otp)
                    && u.otp_expires.is_some_and(|exp| exp > now) =>
            {
                u
            }
            _ => {
                return Err(ProdyError::InvalidInput("Invalid or expired OTP".to_string()).into());
            }
        };

        let mut active: users::ActiveModel = user.into();
        active.is_email_verified = Set(true);
        active.verification_otp = Set(None);
        active.otp_expires = Set(None);
        active.updated_at = Set(now);
        let user = active.update(&self.db).await?;

        self.activity
            .record(&self.db, &user.id, "EMAIL_VERIFIED", "Auth", Some(&user.id), None)
            .await?;

        if let Err(e) = self.mail.send_welcome(&user.email, &user.full_name).await {
            warn!(email = %user.email, "failed to send welcome email: {}", e);
        }

        self.auth_response(user)
    }

    /// Password sign-in. Requires a Verified account with a local password.
    pub async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<AuthResponse> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| ProdyError::Unauthenticated("Invalid credentials".to_string()))?;

        // Google-provisioned accounts have no local password; never attempt
        // a hash comparison for them
        if user.password_hash.is_empty() {
            return Err(ProdyError::Unauthenticated(
                "This account uses Google Login. Please sign in with Google.".to_string(),
            )
            .into());
        }

        if !verify_password(password, &user.password_hash) {
            return Err(
                ProdyError::Unauthenticated("Invalid password or email".to_string()).into(),
            );
        }

        if !user.is_email_verified {
            return Err(ProdyError::email_not_verified().into());
        }

        self.activity
            .record(
                &self.db,
                &user.id,
                "USER_LOGIN",
                "Auth",
                Some(&user.id),
                Some("User logged in with email"),
            )
            .await?;

        self.auth_response(user)
    }

    /// Start a password reset. The response never reveals whether the
    /// account exists.
    pub async fn forgot_password(&self, email: &str) -> anyhow::Result<String> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(RESET_REQUESTED_MESSAGE.to_string());
        };

        let token = generate_reset_token();
        let expires = chrono::Utc::now() + chrono::Duration::minutes(RESET_TOKEN_EXPIRY_MINUTES);

        let user_id = user.id.clone();
        let mut active: users::ActiveModel = user.into();
        active.reset_token = Set(Some(token.clone()));
        active.reset_token_exp = Set(Some(expires));
        active.updated_at = Set(chrono::Utc::now());
        active.update(&self.db).await?;

        self.activity
            .record(
                &self.db,
                &user_id,
                "PASSWORD_RESET_REQUEST",
                "Auth",
                Some(&user_id),
                None,
            )
            .await?;

        if let Err(e) = self.mail.send_password_reset(email, &token).await {
            warn!(email, "failed to send password reset email: {}", e);
        }

        Ok(RESET_REQUESTED_MESSAGE.to_string())
    }

    /// Consume a reset token and store the new password.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> anyhow::Result<String> {
        if new_password.is_empty() {
            return Err(ProdyError::InvalidInput("New password is required".to_string()).into());
        }

        let now = chrono::Utc::now();
        let user = match users::Entity::find()
            .filter(users::Column::ResetToken.eq(token))
            .one(&self.db)
            .await?
        {
            Some(u) if u.reset_token_exp.is_some_and(|exp| exp > now) => u,
            _ => {
                return Err(
                    ProdyError::InvalidInput("Token invalid or expired".to_string()).into(),
                );
            }
        };

        let user_id = user.id.clone();
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(hash_password(new_password)?);
        active.reset_token = Set(None);
        active.reset_token_exp = Set(None);
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        self.activity
            .record(&self.db, &user_id, "PASSWORD_CHANGED", "Auth", Some(&user_id), None)
            .await?;

        Ok("Password updated successfully".to_string())
    }

    /// Federated sign-in through a verified Google id token.
    pub async fn google_auth(&self, id_token: &str) -> anyhow::Result<AuthResponse> {
        let profile = self.google.verify_id_token(id_token).await?;

        let user = self.upsert_google_user(&profile).await?;

        if let Err(e) = self.mail.send_welcome(&user.email, &user.full_name).await {
            warn!(email = %user.email, "failed to send welcome email after Google auth: {}", e);
        }

        self.activity
            .record(
                &self.db,
                &user.id,
                "USER_LOGIN",
                "Auth",
                Some(&user.id),
                Some("User logged in with Google"),
            )
            .await?;

        self.auth_response(user)
    }

    async fn upsert_google_user(&self, profile: &GoogleProfile) -> anyhow::Result<users::Model> {
        let now = chrono::Utc::now();
        let existing = self.find_by_email(&profile.email).await?;

        let user = match existing {
            Some(user) => {
                let mut active: users::ActiveModel = user.into();
                active.first_name = Set(profile.first_name.clone());
                active.last_name = Set(profile.last_name.clone());
                active.full_name = Set(full_name(
                    &profile.first_name,
                    profile.last_name.as_deref(),
                ));
                active.avatar_url = Set(profile.avatar_url.clone());
                active.is_email_verified = Set(true);
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                users::ActiveModel {
                    id: Set(new_entity_id()),
                    email: Set(profile.email.clone()),
                    first_name: Set(profile.first_name.clone()),
                    last_name: Set(profile.last_name.clone()),
                    full_name: Set(full_name(
                        &profile.first_name,
                        profile.last_name.as_deref(),
                    )),
                    // No local password; sign-in must go through Google
                    password_hash: Set(String::new()),
                    avatar_url: Set(profile.avatar_url.clone()),
                    role: Set(ROLE_MEMBER.to_string()),
                    organization_id: Set(None),
                    is_email_verified: Set(true),
                    verification_otp: Set(None),
                    otp_expires: Set(None),
                    reset_token: Set(None),
                    reset_token_exp: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?
            }
        };

        Ok(user)
    }

    /// Mint a new credential pair, unless the presented access token still
    /// has more than the threshold of validity left.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        current_access_token: Option<&str>,
    ) -> anyhow::Result<RefreshOutcome> {
        let claims = self.tokens.decode(refresh_token).map_err(|_| {
            ProdyError::Unauthenticated("Invalid or expired refresh token".to_string())
        })?;

        let user = users::Entity::find_by_id(&claims.sub)
            .one(&self.db)
            .await?
            .ok_or_else(|| ProdyError::Unauthenticated("User not found".to_string()))?;

        if !user.is_email_verified {
            return Err(ProdyError::Unauthenticated("Email not verified".to_string()).into());
        }

        // An undecodable current token simply means: refresh
        let should_refresh = current_access_token
            .and_then(TokenService::remaining_validity_seconds)
            .is_none_or(|remaining| remaining <= REFRESH_THRESHOLD_SECONDS);

        if !should_refresh {
            return Ok(RefreshOutcome::StillValid {
                message: "Token is still valid, no refresh needed".to_string(),
                expires_in: self.tokens.access_ttl_seconds(),
            });
        }

        self.activity
            .record(
                &self.db,
                &user.id,
                "TOKEN_REFRESHED",
                "Auth",
                Some(&user.id),
                Some("Access token refreshed using refresh token"),
            )
            .await?;

        Ok(RefreshOutcome::Refreshed(self.auth_response(user)?))
    }

    /// Profile of the authenticated caller.
    pub async fn me(&self, user_id: &str) -> anyhow::Result<UserSummary> {
        crate::service::user::find_summary(&self.db, user_id).await
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    fn auth_response(&self, user: users::Model) -> anyhow::Result<AuthResponse> {
        let pair = self.tokens.issue(
            &user.id,
            &user.email,
            &user.role,
            user.organization_id.as_deref(),
        )?;

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
            user: UserSummary::from(user),
        })
    }
}
