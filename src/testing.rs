// src/testing.rs

//! Shared test doubles: a scripted cloud client and a per-thread log capture.

use crate::cloud::{CloudClient, CloudError};
use crate::models::{
    DescribeStacksPage, Export, ListExportsPage, StackDescription, StackOutput, TemplateBody,
    TemplateResponse,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Once;

pub(crate) type CallLog = Rc<RefCell<Vec<String>>>;

/// A cloud client answering from canned pages.
///
/// Pages are keyed by the continuation token that requests them, so repeated listings
/// (for example one by a resolver and one by a bulk import) see the same data.
#[derive(Debug, Default)]
pub(crate) struct StubCloudClient {
    stack_pages: Vec<(Option<String>, DescribeStacksPage)>,
    export_pages: Vec<(Option<String>, ListExportsPage)>,
    named_stacks: HashMap<String, StackDescription>,
    templates: HashMap<String, TemplateBody>,
    calls: CallLog,
}

impl StubCloudClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_stack_page(mut self, stacks: Vec<StackDescription>, next: Option<&str>) -> Self {
        let request_token = self.stack_pages.last().and_then(|(_, page)| page.next_token.clone());
        self.stack_pages.push((
            request_token,
            DescribeStacksPage {
                stacks,
                next_token: next.map(str::to_string),
            },
        ));
        self
    }

    pub(crate) fn with_export_page(mut self, exports: Vec<Export>, next: Option<&str>) -> Self {
        let request_token = self.export_pages.last().and_then(|(_, page)| page.next_token.clone());
        self.export_pages.push((
            request_token,
            ListExportsPage {
                exports,
                next_token: next.map(str::to_string),
            },
        ));
        self
    }

    /// Registers a stack answered by name lookups.
    pub(crate) fn with_stack(mut self, stack: StackDescription) -> Self {
        self.named_stacks.insert(stack.stack_name.clone(), stack);
        self
    }

    pub(crate) fn with_template(mut self, stack_name: &str, body: TemplateBody) -> Self {
        self.templates.insert(stack_name.to_string(), body);
        self
    }

    /// A shared handle on the recorded calls, usable after the client is boxed.
    pub(crate) fn calls(&self) -> CallLog {
        Rc::clone(&self.calls)
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl CloudClient for StubCloudClient {
    fn describe_stacks(
        &self,
        stack_name: Option<&str>,
        next_token: Option<&str>,
    ) -> Result<DescribeStacksPage, CloudError> {
        self.record(format!("describe_stacks({:?}, {:?})", stack_name, next_token));
        if let Some(name) = stack_name {
            return Ok(DescribeStacksPage {
                stacks: self.named_stacks.get(name).cloned().into_iter().collect(),
                next_token: None,
            });
        }
        Ok(self
            .stack_pages
            .iter()
            .find(|(token, _)| token.as_deref() == next_token)
            .map(|(_, page)| page.clone())
            .unwrap_or_default())
    }

    fn get_template(&self, stack_name: &str) -> Result<TemplateResponse, CloudError> {
        self.record(format!("get_template({:?})", stack_name));
        self.templates
            .get(stack_name)
            .cloned()
            .map(|template_body| TemplateResponse { template_body })
            .ok_or_else(|| CloudError::StackNotFound(stack_name.to_string()))
    }

    fn list_exports(&self, next_token: Option<&str>) -> Result<ListExportsPage, CloudError> {
        self.record(format!("list_exports({:?})", next_token));
        Ok(self
            .export_pages
            .iter()
            .find(|(token, _)| token.as_deref() == next_token)
            .map(|(_, page)| page.clone())
            .unwrap_or_default())
    }
}

// --- Fixture builders ---

pub(crate) fn stack(name: &str) -> StackDescription {
    StackDescription {
        stack_name: name.to_string(),
        ..Default::default()
    }
}

pub(crate) fn stack_with_outputs(name: &str, outputs: Vec<StackOutput>) -> StackDescription {
    StackDescription {
        stack_name: name.to_string(),
        outputs,
        ..Default::default()
    }
}

pub(crate) fn output(key: &str, value: &str) -> StackOutput {
    StackOutput {
        output_key: key.to_string(),
        output_value: value.to_string(),
        ..Default::default()
    }
}

pub(crate) fn exported_output(key: &str, value: &str, export_name: &str) -> StackOutput {
    StackOutput {
        export_name: Some(export_name.to_string()),
        ..output(key, value)
    }
}

pub(crate) fn export(name: &str, value: &str) -> Export {
    Export {
        name: name.to_string(),
        value: value.to_string(),
        exporting_stack_id: None,
    }
}

// --- Log capture ---

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        CAPTURED.with(|captured| {
            captured
                .borrow_mut()
                .push((record.level(), record.args().to_string()));
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Runs `f` and returns its result with every log record emitted on this thread meanwhile.
pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    CAPTURED.with(|captured| captured.borrow_mut().clear());
    let result = f();
    let records = CAPTURED.with(|captured| captured.borrow_mut().drain(..).collect());
    (result, records)
}

/// The messages captured at `level`.
pub(crate) fn messages_at(records: &[(Level, String)], level: Level) -> Vec<&str> {
    records
        .iter()
        .filter(|(l, _)| *l == level)
        .map(|(_, message)| message.as_str())
        .collect()
}
