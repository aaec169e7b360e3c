use dashmap::DashMap;
use shared::AppError;
use std::collections::VecDeque;

/// 呼び出し回数の計測と障害注入の対象となる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    SignUp,
    SignIn,
    FederatedSignIn,
    SignOut,
    Reauthenticate,
    UpdateProfile,
    UpdatePassword,
    Insert,
    Update,
    Delete,
    Get,
}

#[derive(Default)]
pub(super) struct FaultInjector {
    calls: DashMap<BackendOperation, usize>,
    failures: DashMap<BackendOperation, VecDeque<AppError>>,
}

impl FaultInjector {
    pub(super) fn inject(&self, operation: BackendOperation, error: AppError) {
        self.failures.entry(operation).or_default().push_back(error);
    }

    pub(super) fn call_count(&self, operation: BackendOperation) -> usize {
        self.calls.get(&operation).map(|count| *count).unwrap_or(0)
    }

    /// 呼び出しを記録し、注入された障害があれば返す
    pub(super) fn enter(&self, operation: BackendOperation) -> Result<(), AppError> {
        *self.calls.entry(operation).or_insert(0) += 1;
        let injected = self
            .failures
            .get_mut(&operation)
            .and_then(|mut queue| queue.pop_front());
        match injected {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
