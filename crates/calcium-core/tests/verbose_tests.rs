//! The VERBOSE context option: diagnostics must actually reach the
//! `log` facade.
//!
//! This binary installs its own capturing logger instead of the shared
//! env_logger setup, so it can assert on the emitted records.

use calcium_core::{Ca, Context, Options, Truth};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;

struct CaptureLogger {
    records: Mutex<Vec<String>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.records
                .lock()
                .unwrap()
                .push(format!("{}", record.args()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn verbose_context_emits_diagnostics() {
    log::set_logger(&CAPTURE).expect("no other logger in this binary");
    log::set_max_level(LevelFilter::Debug);

    let mut ctx = Context::with_options(Options {
        verbose: true,
        ..Options::default()
    });

    // Interning traces: extensions and fields.
    let pi = ctx.pi();
    let r = ctx.sqrt(&Ca::from_i64(2));
    let sum = ctx.add(&pi, &r);

    // Zero-test trace: a Multi payload enters the adaptive cascade.
    assert_eq!(ctx.check_is_zero(&sum), Truth::False);

    let records = CAPTURE.records.lock().unwrap().clone();
    assert!(
        records.iter().any(|r| r.contains("interned")),
        "expected interning diagnostics, got {records:?}"
    );
    assert!(
        records.iter().any(|r| r.contains("zero test")),
        "expected a zero-test diagnostic, got {records:?}"
    );

    // A quiet context must add nothing new.
    let before = CAPTURE.records.lock().unwrap().len();
    let mut quiet = Context::new();
    let e = quiet.exp(&Ca::one());
    let x = quiet.sub_i64(&e, 2);
    assert_eq!(quiet.check_is_zero(&x), Truth::False);
    let after = CAPTURE.records.lock().unwrap().len();
    assert_eq!(before, after, "quiet context emitted diagnostics");
}
