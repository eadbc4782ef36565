// 統合テスト

#[allow(dead_code)]
#[path = "../fixtures/mod.rs"]
mod fixtures;

mod test_completeness;
mod test_failures;
