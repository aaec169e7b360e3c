use crate::errors::DomainError;

/// プロフィール編集フォームの入力値
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProfileChangeRequest {
    pub new_display_name: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl std::fmt::Debug for ProfileChangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileChangeRequest")
            .field("new_display_name", &self.new_display_name)
            .field("password_change", &!self.new_password.is_empty())
            .finish()
    }
}

/// パスワード変更の内容
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}

/// 検証済みのプロフィール更新計画
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChangePlan {
    pub new_display_name: Option<String>,
    pub password_change: Option<PasswordChange>,
}

impl ProfileChangeRequest {
    /// バックエンドに問い合わせる前のローカル検証
    ///
    /// 確認用パスワードの不一致は新パスワードの有無に関わらずエラーになる。
    pub fn validate(&self) -> Result<ProfileChangePlan, DomainError> {
        if self.new_password != self.confirm_new_password {
            return Err(DomainError::PasswordConfirmationMismatch);
        }

        let password_change = if self.new_password.is_empty() {
            None
        } else {
            if self.current_password.is_empty() {
                return Err(DomainError::CurrentPasswordRequired);
            }
            Some(PasswordChange {
                current_password: self.current_password.clone(),
                new_password: self.new_password.clone(),
            })
        };

        // 前後の空白は除いてから比較・保存する。空白のみは未入力扱い。
        let name = self.new_display_name.trim();
        let new_display_name = (!name.is_empty()).then(|| name.to_string());

        Ok(ProfileChangePlan {
            new_display_name,
            password_change,
        })
    }
}

impl ProfileChangePlan {
    /// 現在の表示名と異なる場合のみ新しい表示名を返す
    pub fn display_name_change(&self, current: Option<&str>) -> Option<&str> {
        match self.new_display_name.as_deref() {
            Some(name) if Some(name) != current => Some(name),
            _ => None,
        }
    }
}
