//! Accounts Module
//!
//! ローカル専用のアカウント管理（ログイン、パスワード再設定、プロフィール編集、
//! 管理者によるユーザー管理）。状態は注入された`KeyValueStore`に保存します。
//!
//! # 使用例
//!
//! ```rust
//! use listas_pdf::accounts::{AccountConfig, AccountService, MemoryStore};
//!
//! # fn main() -> Result<(), listas_pdf::accounts::AccountError> {
//! let mut accounts = AccountService::new(MemoryStore::new(), AccountConfig::default())?;
//!
//! // 管理者はパスワードなしでログインできる
//! let admin = accounts.login("admin@example.com", None)?;
//! assert_eq!(accounts.session()?.map(|u| u.id), Some(admin.id));
//! # Ok(())
//! # }
//! ```

mod service;
mod store;

pub use service::AccountService;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ユーザー一覧を保存するキー
pub const USERS_KEY: &str = "users";

/// 現在のセッションを保存するキー
pub const SESSION_KEY: &str = "session";

/// 初期管理者のID
pub const SEED_ADMIN_ID: &str = "admin-1";

/// ユーザーの権限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// 保存されたユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,

    /// Argon2のPHC形式ハッシュ（平文は保存しない）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// アバター画像（URLまたはデータURI）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
}

impl User {
    /// パスワードハッシュを除いたコピー（セッション用）
    pub fn without_secret(&self) -> User {
        User {
            password_hash: None,
            ..self.clone()
        }
    }
}

/// 新規ユーザーの入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password: String,
}

/// ユーザーの部分更新
///
/// `None`のフィールドは変更しません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
    pub avatar: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

/// アカウント設定
///
/// 初期管理者はストアにユーザー一覧が存在しない場合にのみ作成されます。
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// 初期管理者の作成時のメールアドレス
    pub admin_email: String,

    /// 初期管理者の表示名
    pub admin_name: String,

    /// 初期管理者のパスワード
    pub admin_password: String,

    /// パスワードハッシュのパラメータ
    pub hash_params: argon2::Params,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@example.com".to_string(),
            admin_name: "Administrador".to_string(),
            admin_password: "admin123".to_string(),
            hash_params: argon2::Params::default(),
        }
    }
}

/// アカウント操作のエラー型
///
/// 利用者向けのエラーはスペイン語の固定文言を`Display`として持ちます。
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("No encontramos un usuario con este correo electrónico.")]
    UnknownEmail,

    #[error("El usuario ya existe")]
    UserExists,

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("El correo electrónico ya está en uso por otro usuario")]
    EmailInUse,

    #[error("No se puede eliminar al administrador principal")]
    PrimaryAdmin,

    /// パスワードのハッシュ化に失敗
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// 保存されたデータが読めない
    #[error("Invalid account data: {0}")]
    Serialization(#[from] serde_json::Error),
}
