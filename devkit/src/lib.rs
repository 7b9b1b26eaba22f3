/*!
# WebClaw DevKit - stubs and fixtures for tests

Shared by the kernel and landing test suites:
- stub webhook server recording every forwarded payload
- captured `ss` / `netstat` outputs for detector tests
- tracing + response body helpers
*/

pub mod fixtures;
pub mod test_utils;
pub mod webhook_stub;

pub use test_utils::{init_test_tracing, read_json, read_text};
pub use webhook_stub::{unreachable_url, StubWebhook};
