//! Phone OTP issuance and verification
//!
//! Both operations run inside a single transaction. Issuance only commits
//! once the SMS gateway accepted the message, so a delivery failure never
//! leaves a live code behind. Verification picks the newest unused code for
//! the phone, which makes a concurrent second issuance harmless.

use chrono::{Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{otp_code, user};
use crate::services::security;
use crate::services::sms::SmsNotifier;

pub const OTP_TTL_SECS: i64 = 5 * 60;
pub const MAX_ATTEMPTS: i32 = 3;

/// Terminal verification failures, all reported to the client as 400s
#[derive(Debug, PartialEq, Eq)]
pub enum OtpError {
    NotFound,
    Expired,
    TooManyAttempts,
    InvalidCode { remaining: i32 },
}

impl From<OtpError> for AppError {
    fn from(err: OtpError) -> Self {
        let message = match err {
            OtpError::NotFound => "OTP not found or expired. Please request a new one.".to_string(),
            OtpError::Expired => "OTP has expired. Please request a new one.".to_string(),
            OtpError::TooManyAttempts => {
                "Too many failed attempts. Please request a new OTP.".to_string()
            }
            OtpError::InvalidCode { remaining } => {
                format!("Invalid OTP. {} attempts remaining.", remaining)
            }
        };
        AppError::Validation(message)
    }
}

/// A successful verification: the (possibly just-created) user and a token
pub struct VerifiedSession {
    pub user: user::Model,
    pub token: String,
    pub is_new_user: bool,
}

/// Issue a fresh code for the phone and dispatch it over SMS.
///
/// Upserts the user row, clears codes that are already used or expired,
/// inserts the new code and commits only after the gateway accepted the
/// message. Returns the code validity in seconds.
pub async fn issue_code(db: &DbConn, sms: &SmsNotifier, phone: &str) -> Result<i64> {
    let now = Utc::now();
    let code = security::generate_otp();

    let txn = db.begin().await?;

    let new_user = user::ActiveModel {
        phone: Set(phone.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    User::insert(new_user)
        .on_conflict(
            OnConflict::column(user::Column::Phone)
                .update_column(user::Column::UpdatedAt)
                .to_owned(),
        )
        .exec(&txn)
        .await?;

    OtpCode::delete_many()
        .filter(otp_code::Column::Phone.eq(phone))
        .filter(
            Condition::any()
                .add(otp_code::Column::IsUsed.eq(true))
                .add(otp_code::Column::ExpiresAt.lt(now)),
        )
        .exec(&txn)
        .await?;

    let new_code = otp_code::ActiveModel {
        phone: Set(phone.to_string()),
        code: Set(code.clone()),
        expires_at: Set(now + Duration::seconds(OTP_TTL_SECS)),
        is_used: Set(false),
        attempts: Set(0),
        created_at: Set(now),
        ..Default::default()
    };
    new_code.insert(&txn).await?;

    let message = format!(
        "Your NaiyakSetu verification code is {}. Valid for 5 minutes.",
        code
    );
    if let Err(e) = sms.send(phone, &message).await {
        txn.rollback().await?;
        return Err(e);
    }

    txn.commit().await?;

    tracing::info!(phone = %phone, "OTP issued");
    Ok(OTP_TTL_SECS)
}

/// Verify a submitted code and mint a session token.
///
/// Branch ordering is expiry, then attempt exhaustion, then value match.
/// A mismatch burns an attempt and reports how many are left.
pub async fn verify_code(db: &DbConn, phone: &str, code: &str) -> Result<VerifiedSession> {
    let now = Utc::now();

    let txn = db.begin().await?;

    let record = OtpCode::find()
        .filter(otp_code::Column::Phone.eq(phone))
        .filter(otp_code::Column::IsUsed.eq(false))
        .order_by_desc(otp_code::Column::CreatedAt)
        .one(&txn)
        .await?;

    let record = match record {
        Some(r) => r,
        None => {
            txn.commit().await?;
            return Err(OtpError::NotFound.into());
        }
    };

    // Expiry and exhaustion are terminal: the row is gone afterwards, so a
    // repeat verify reports NotFound rather than the same failure forever
    if record.expires_at < now {
        OtpCode::delete_by_id(record.id).exec(&txn).await?;
        txn.commit().await?;
        return Err(OtpError::Expired.into());
    }

    if record.attempts >= MAX_ATTEMPTS {
        OtpCode::delete_by_id(record.id).exec(&txn).await?;
        txn.commit().await?;
        return Err(OtpError::TooManyAttempts.into());
    }

    if record.code != code {
        let attempts = record.attempts + 1;
        let mut active: otp_code::ActiveModel = record.into();
        active.attempts = Set(attempts);
        active.update(&txn).await?;
        txn.commit().await?;
        return Err(OtpError::InvalidCode {
            remaining: MAX_ATTEMPTS - attempts,
        }
        .into());
    }

    let mut used: otp_code::ActiveModel = record.into();
    used.is_used = Set(true);
    used.update(&txn).await?;

    let user_row = User::find()
        .filter(user::Column::Phone.eq(phone))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("User row missing for verified phone".to_string()))?;

    let is_new_user = user_row.name.is_none();

    let mut update: user::ActiveModel = user_row.into();
    update.is_verified = Set(true);
    update.last_login = Set(Some(now));
    update.updated_at = Set(now);
    let user_row = update.update(&txn).await?;

    txn.commit().await?;

    let token = security::create_session_token(user_row.id, &user_row.phone)?;

    tracing::info!(user_id = user_row.id, "OTP verified, session issued");

    Ok(VerifiedSession {
        user: user_row,
        token,
        is_new_user,
    })
}
