use domain::{DomainError, Todo, TodoId, TodoText};

/// 編集対象の項目
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditTarget {
    pub id: Option<TodoId>,
    pub text: String,
}

impl From<&Todo> for EditTarget {
    fn from(todo: &Todo) -> Self {
        Self {
            id: Some(todo.id.clone()),
            text: todo.text.clone(),
        }
    }
}

/// 項目編集モーダル
///
/// 入力バッファは対象項目のテキストで初期化され、対象が設定されるたびにリセットされる。
/// 閉じるとバッファは破棄される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemEditorModal {
    pub is_open: bool,
    pub target: EditTarget,
    pub buffer: String,
}

impl ItemEditorModal {
    pub fn open(&mut self, target: EditTarget) {
        self.set_target(target);
        self.is_open = true;
    }

    /// 編集対象を差し替える。同じ項目であってもバッファは必ず再初期化する。
    pub fn set_target(&mut self, target: EditTarget) {
        self.buffer = target.text.clone();
        self.target = target;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// 保存要求の検証。空白のみのテキストや対象なしはエラー。
    pub fn save_request(&self) -> Result<(TodoId, TodoText), DomainError> {
        let id = self
            .target
            .id
            .clone()
            .ok_or_else(|| DomainError::Validation("no item selected".to_string()))?;
        let text = TodoText::parse(self.buffer.clone())?;
        Ok((id, text))
    }
}
