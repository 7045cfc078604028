//! Account Service
//!
//! ユーザー一覧とセッションをストア上のJSONとして管理するサービス。

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Version};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    AccountConfig, AccountError, KeyValueStore, NewUser, Role, User, UserUpdate, SEED_ADMIN_ID,
    SESSION_KEY, USERS_KEY,
};

/// アカウント管理サービス
///
/// ユーザー一覧は`users`キー、ログイン中のユーザーは`session`キーに保存します。
/// セッションにはパスワードハッシュを含めません。
#[derive(Debug)]
pub struct AccountService<S: KeyValueStore> {
    store: S,
    config: AccountConfig,
}

impl<S: KeyValueStore> AccountService<S> {
    /// サービスを生成する
    ///
    /// ストアにユーザー一覧が存在しない場合、設定された初期管理者を作成します。
    pub fn new(store: S, config: AccountConfig) -> Result<Self, AccountError> {
        let mut service = Self { store, config };

        if service.store.get(USERS_KEY).is_none() {
            let admin = User {
                id: SEED_ADMIN_ID.to_string(),
                email: service.config.admin_email.clone(),
                name: service.config.admin_name.clone(),
                role: Role::Admin,
                password_hash: Some(service.hash_password(&service.config.admin_password)?),
                avatar: None,
                birthdate: None,
            };
            service.save_users(&[admin])?;
            info!(email = %service.config.admin_email, "seed administrator created");
        }

        Ok(service)
    }

    /// 内部のストアを取り出す
    pub fn into_store(self) -> S {
        self.store
    }

    /// ログインする
    ///
    /// パスワードを省略（または空文字列）できるのは初期管理者（`SEED_ADMIN_ID`）の
    /// 現在のメールアドレスのみです。
    ///
    /// # 戻り値
    ///
    /// * `Ok(User)` - セッションに保存されたユーザー（パスワードハッシュなし）
    /// * `Err(AccountError::InvalidCredentials)` - メールアドレスまたはパスワードが一致しない
    pub fn login(&mut self, email: &str, password: Option<&str>) -> Result<User, AccountError> {
        let users = self.users()?;
        let password = password.filter(|p| !p.is_empty());

        let user = match password {
            None => users
                .into_iter()
                .find(|u| u.id == SEED_ADMIN_ID && u.email == email),
            Some(password) => users.into_iter().find(|u| {
                u.email == email
                    && u.password_hash
                        .as_deref()
                        .is_some_and(|hash| verify_password(password, hash))
            }),
        };

        let Some(user) = user else {
            warn!(email, "login rejected");
            return Err(AccountError::InvalidCredentials);
        };

        let session = user.without_secret();
        self.store
            .put(SESSION_KEY, serde_json::to_string(&session)?)?;
        info!(user = %session.id, "logged in");
        Ok(session)
    }

    /// ログアウトする
    pub fn logout(&mut self) -> Result<(), AccountError> {
        self.store.delete(SESSION_KEY)?;
        debug!("logged out");
        Ok(())
    }

    /// 現在のセッション
    pub fn session(&self) -> Result<Option<User>, AccountError> {
        match self.store.get(SESSION_KEY) {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// パスワード再設定を要求する
    ///
    /// メールアドレスが登録済みであることのみ確認します（送信処理はありません）。
    pub fn recover_password(&self, email: &str) -> Result<(), AccountError> {
        if !self.users()?.iter().any(|u| u.email == email) {
            warn!(email, "password recovery for unknown email");
            return Err(AccountError::UnknownEmail);
        }

        info!(email, "password recovery requested");
        Ok(())
    }

    /// 登録済みのユーザー一覧
    pub fn users(&self) -> Result<Vec<User>, AccountError> {
        match self.store.get(USERS_KEY) {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// ユーザーを作成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(User)` - 作成されたユーザー（IDはUUID v4）
    /// * `Err(AccountError::UserExists)` - 同じメールアドレスのユーザーが存在する
    pub fn create_user(&mut self, new_user: NewUser) -> Result<User, AccountError> {
        let mut users = self.users()?;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AccountError::UserExists);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new_user.email,
            name: new_user.name,
            role: new_user.role,
            password_hash: Some(self.hash_password(&new_user.password)?),
            avatar: None,
            birthdate: None,
        };

        users.push(user.clone());
        self.save_users(&users)?;
        info!(user = %user.id, "user created");
        Ok(user)
    }

    /// ユーザーを部分更新する
    ///
    /// 更新対象がログイン中のユーザーの場合、セッションも更新します。
    pub fn update_user(&mut self, id: &str, update: UserUpdate) -> Result<User, AccountError> {
        let mut users = self.users()?;
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(AccountError::UserNotFound)?;

        if let Some(email) = &update.email {
            if *email != users[index].email && users.iter().any(|u| u.email == *email && u.id != id)
            {
                return Err(AccountError::EmailInUse);
            }
        }

        let password_hash = match &update.password {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        let user = &mut users[index];
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if password_hash.is_some() {
            user.password_hash = password_hash;
        }
        if update.avatar.is_some() {
            user.avatar = update.avatar;
        }
        if update.birthdate.is_some() {
            user.birthdate = update.birthdate;
        }
        let updated = user.clone();

        self.save_users(&users)?;

        if self.session()?.is_some_and(|session| session.id == id) {
            self.store
                .put(SESSION_KEY, serde_json::to_string(&updated.without_secret())?)?;
        }

        info!(user = %updated.id, "user updated");
        Ok(updated)
    }

    /// ユーザーを削除する
    ///
    /// 初期管理者（`SEED_ADMIN_ID`）はメールアドレスを変更した後も削除できません。
    /// 存在しないIDは何もしません。
    pub fn delete_user(&mut self, id: &str) -> Result<(), AccountError> {
        if id == SEED_ADMIN_ID {
            return Err(AccountError::PrimaryAdmin);
        }

        let mut users = self.users()?;

        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() != before {
            self.save_users(&users)?;
            info!(user = id, "user deleted");
        }
        Ok(())
    }

    /// 管理者がユーザーのパスワードを再設定する
    pub fn reset_password(&mut self, id: &str, new_password: &str) -> Result<(), AccountError> {
        let mut users = self.users()?;
        let hash = self.hash_password(new_password)?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AccountError::UserNotFound)?;
        user.password_hash = Some(hash);

        self.save_users(&users)?;
        info!(user = id, "password reset");
        Ok(())
    }

    fn save_users(&mut self, users: &[User]) -> Result<(), AccountError> {
        self.store.put(USERS_KEY, serde_json::to_string(users)?)?;
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, AccountError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            self.config.hash_params.clone(),
        );

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AccountError::PasswordHash(e.to_string()))
    }
}

/// パスワードを保存済みのハッシュと照合する
///
/// ハッシュの形式が不正な場合は一致しないものとして扱います。
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
