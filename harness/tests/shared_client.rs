//! `shared_client` reads the environment once. Kept in its own test binary
//! so setting variables cannot race with other tests.

#[test]
fn shared_client_is_built_once_from_env() {
    std::env::set_var("TESTRAIL_URL", "https://tr.example.com");
    std::env::set_var("TESTRAIL_USER", "bot@example.com");
    std::env::set_var("TESTRAIL_PASSWORD", "api-key");
    std::env::set_var("TESTRAIL_PROJECT_ID", "1");

    let first = testrail_harness::shared_client().unwrap();
    assert_eq!(first.base_url(), "https://tr.example.com/index.php?/api/v2/");
    assert_eq!(first.user(), "bot@example.com");

    std::env::set_var("TESTRAIL_USER", "someone-else");
    let second = testrail_harness::shared_client().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(second.user(), "bot@example.com");
}
