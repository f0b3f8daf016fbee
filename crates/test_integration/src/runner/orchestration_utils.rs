use color_eyre::Result;
use colored::Colorize;
use std::future::Future;
use std::sync::Once;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[macro_export]
macro_rules! run_test {
    ($call:expr) => {
        $crate::runner::orchestration_utils::run_test_impl(stringify!($call), $call)
    };
}

/// Runs each test in order against one context, stopping at the first failure.
///
/// Later tests may depend on records created by earlier ones.
#[macro_export]
macro_rules! execute_suite {
    ($context:expr, [ $($test_fn:ident),* $(,)? ]) => {{
        let names: &[&str] = &[$(stringify!($test_fn)),*];
        let started = std::time::Instant::now();
        let mut passed = 0_usize;
        $(
            $crate::run_test!($test_fn($context)).await?;
            passed += 1;
        )*
        $crate::runner::orchestration_utils::print_summary(passed, names.len(), started.elapsed());
    }};
}

fn separator() -> String {
    "─".repeat(60).as_str().dimmed().to_string()
}

/// `tests::test_detect::test_detect_valid_jpeg(&context)` → `test_detect_valid_jpeg`.
fn display_name(call: &str) -> &str {
    let path = call.split('(').next().unwrap_or(call);
    path.rsplit("::").next().unwrap_or(path).trim()
}

pub fn print_summary(passed: usize, total: usize, elapsed: Duration) {
    println!("{}", separator());
    println!(
        "{} {passed}/{total} passed in {elapsed:.2?}",
        " SUITE ".on_purple().black().bold()
    );
    println!("{}\n", separator());
}

/// Awaits one test, printing its name, outcome and duration.
pub async fn run_test_impl<Fut>(call: &str, test: Fut) -> Result<()>
where
    Fut: Future<Output = Result<()>>,
{
    let name = display_name(call);
    println!("{}", separator());
    println!("{} {}", " RUN ".on_cyan().black().bold(), name.cyan());

    let started = Instant::now();
    let result = test.await;
    let elapsed = started.elapsed();

    match &result {
        Ok(()) => println!("{} {name} ({elapsed:.2?})", " OK ".on_green().black().bold()),
        Err(e) => println!(
            "{} {} ({elapsed:.2?})\n\n{e:?}",
            " FAIL ".on_red().black().bold(),
            name.red()
        ),
    }
    result
}

static TRACING: Once = Once::new();

/// Installs the log subscriber and color-eyre once per test binary.
pub fn setup_tracing_and_panic_handling() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "info,sqlx=warn,api=debug,common_services=debug,hyper=error,reqwest=error".into()
        });
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .with_target(false)
            .init();

        color_eyre::install().expect("color-eyre installs once");
    });
}

#[cfg(test)]
mod tests {
    use super::display_name;

    #[test]
    fn display_name_strips_path_and_args() {
        assert_eq!(
            display_name("tests::test_detect::test_detect_valid_jpeg(&context)"),
            "test_detect_valid_jpeg"
        );
        assert_eq!(display_name("test_root_endpoint(ctx)"), "test_root_endpoint");
    }
}
