use domain::{DomainError, ProfileChangePlan, ProfileChangeRequest};

pub const WRONG_PASSWORD_MESSAGE: &str = "The current password is incorrect. Please try again.";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "New password and confirm new password must match.";
pub const CURRENT_PASSWORD_REQUIRED_MESSAGE: &str = "Please enter your current password.";

/// プロフィール編集フォームの入力欄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    DisplayName,
    CurrentPassword,
    NewPassword,
    ConfirmNewPassword,
}

impl ProfileField {
    fn is_password(&self) -> bool {
        !matches!(self, ProfileField::DisplayName)
    }
}

/// プロフィール編集モーダル
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEditorModal {
    pub is_open: bool,
    pub form: ProfileChangeRequest,
    /// 現在のパスワード欄のエラー
    pub password_error: Option<String>,
    /// 確認用パスワード欄のエラー
    pub confirm_password_error: Option<String>,
}

impl ProfileEditorModal {
    pub fn open(&mut self) {
        self.clear_errors();
        self.is_open = true;
    }

    /// 閉じると入力内容は破棄される
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::DisplayName => self.form.new_display_name = value,
            ProfileField::CurrentPassword => self.form.current_password = value,
            ProfileField::NewPassword => self.form.new_password = value,
            ProfileField::ConfirmNewPassword => self.form.confirm_new_password = value,
        }
        if field.is_password() {
            self.clear_errors();
        }
    }

    pub fn clear_errors(&mut self) {
        self.password_error = None;
        self.confirm_password_error = None;
    }

    /// ローカル検証。失敗した場合は該当欄にエラーを設定する。
    pub fn validate(&mut self) -> Result<ProfileChangePlan, DomainError> {
        self.clear_errors();
        self.form.validate().inspect_err(|e| self.apply_validation_error(e))
    }

    pub fn apply_validation_error(&mut self, error: &DomainError) {
        match error {
            DomainError::PasswordConfirmationMismatch => {
                self.confirm_password_error = Some(PASSWORD_MISMATCH_MESSAGE.to_string())
            }
            DomainError::CurrentPasswordRequired => {
                self.password_error = Some(CURRENT_PASSWORD_REQUIRED_MESSAGE.to_string())
            }
            _ => {}
        }
    }

    pub fn show_wrong_password(&mut self) {
        self.password_error = Some(WRONG_PASSWORD_MESSAGE.to_string());
    }

    pub fn has_errors(&self) -> bool {
        self.password_error.is_some() || self.confirm_password_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_sets_confirmation_error() {
        let mut modal = ProfileEditorModal::default();
        modal.open();
        modal.set_field(ProfileField::CurrentPassword, "old-secret");
        modal.set_field(ProfileField::NewPassword, "new-secret");
        modal.set_field(ProfileField::ConfirmNewPassword, "new-secrex");

        assert_eq!(
            modal.validate(),
            Err(DomainError::PasswordConfirmationMismatch)
        );
        assert_eq!(
            modal.confirm_password_error.as_deref(),
            Some(PASSWORD_MISMATCH_MESSAGE)
        );
        assert!(modal.password_error.is_none());
    }

    #[test]
    fn test_missing_current_password() {
        let mut modal = ProfileEditorModal::default();
        modal.set_field(ProfileField::NewPassword, "new-secret");
        modal.set_field(ProfileField::ConfirmNewPassword, "new-secret");

        assert_eq!(modal.validate(), Err(DomainError::CurrentPasswordRequired));
        assert_eq!(
            modal.password_error.as_deref(),
            Some(CURRENT_PASSWORD_REQUIRED_MESSAGE)
        );
    }

    #[test]
    fn test_password_edit_clears_errors() {
        let mut modal = ProfileEditorModal::default();
        modal.show_wrong_password();
        modal.set_field(ProfileField::DisplayName, "Alice");
        assert!(modal.has_errors());

        modal.set_field(ProfileField::CurrentPassword, "retry");
        assert!(!modal.has_errors());
    }

    #[test]
    fn test_open_clears_errors_and_close_discards_form() {
        let mut modal = ProfileEditorModal::default();
        modal.set_field(ProfileField::DisplayName, "Alice");
        modal.show_wrong_password();

        modal.open();
        assert!(!modal.has_errors());
        assert_eq!(modal.form.new_display_name, "Alice");

        modal.close();
        assert!(!modal.is_open);
        assert_eq!(modal.form, ProfileChangeRequest::default());
    }

    #[test]
    fn test_display_name_only() {
        let mut modal = ProfileEditorModal::default();
        modal.set_field(ProfileField::DisplayName, "  Alice ");

        let plan = modal.validate().unwrap();
        assert_eq!(plan.new_display_name.as_deref(), Some("Alice"));
        assert!(plan.password_change.is_none());
    }
}
