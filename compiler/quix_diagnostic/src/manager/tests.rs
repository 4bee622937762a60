use super::*;
use pretty_assertions::assert_eq;

use quix_ir::{Location, Span};

use crate::{ConcurrentDiagnostics, IssueCode};

fn msg(subject: &str) -> DiagMessage {
    DiagMessage::error(IssueCode::SyntaxError, subject).at(Span::new(
        Location::from_raw(1),
        Location::from_raw(2),
    ))
}

fn warn(subject: &str) -> DiagMessage {
    DiagMessage::new(Severity::Warn, IssueCode::Default, subject)
}

#[test]
fn duplicate_in_one_ticket_is_stored_once() {
    let mut diags = DiagnosticManager::default();
    assert!(diags.push(Ticket::PARSE, msg("Expected ';'")));
    assert!(!diags.push(Ticket::PARSE, msg("Expected ';'")));
    assert_eq!(diags.count(Ticket::PARSE), 1);
}

#[test]
fn duplicate_across_tickets_is_stored_twice() {
    let mut diags = DiagnosticManager::default();
    assert!(diags.push(Ticket::PARSE, msg("Expected ';'")));
    assert!(diags.push(Ticket::CONVERT, msg("Expected ';'")));
    assert_eq!(diags.count(Ticket::ALL), 2);
}

#[test]
fn dedup_keeps_first_seen_order() {
    let mut diags = DiagnosticManager::default();
    for s in ["a", "b", "a", "c", "b"] {
        diags.push(Ticket::PARSE, msg(s));
    }
    let subjects: Vec<&str> = diags
        .messages(Ticket::PARSE)
        .iter()
        .map(|m| m.subject.as_str())
        .collect();
    assert_eq!(subjects, vec!["a", "b", "c"]);
}

#[test]
fn location_is_part_of_identity() {
    let mut diags = DiagnosticManager::default();
    diags.push(Ticket::PARSE, msg("x"));
    diags.push(Ticket::PARSE, DiagMessage::error(IssueCode::SyntaxError, "x"));
    assert_eq!(diags.count(Ticket::PARSE), 2);
}

#[test]
fn dedup_can_be_disabled() {
    let mut diags = DiagnosticManager::new(DiagnosticConfig {
        deduplicate: false,
        ..DiagnosticConfig::default()
    });
    diags.push(Ticket::PARSE, msg("x"));
    diags.push(Ticket::PARSE, msg("x"));
    assert_eq!(diags.count(Ticket::PARSE), 2);
}

#[test]
fn last_aliases_most_recent_channel() {
    let mut diags = DiagnosticManager::default();
    let audit = Ticket::new(7);
    diags.push(Ticket::PARSE, msg("p"));
    diags.push(audit, warn("w1"));
    diags.push(audit, warn("w2"));
    assert_eq!(diags.count(Ticket::LAST), 2);

    diags.push(Ticket::LAST, warn("w3"));
    assert_eq!(diags.count(audit), 3);
    assert_eq!(diags.clear(Ticket::LAST), 3);
    assert_eq!(diags.count(Ticket::ALL), 1);
}

#[test]
fn fail_flag_is_sticky() {
    let mut diags = DiagnosticManager::default();
    diags.push(Ticket::PARSE, warn("just a warning"));
    assert!(!diags.has_failed());

    diags.push(Ticket::PARSE, msg("boom"));
    assert!(diags.has_failed());
    assert_eq!(diags.clear(Ticket::ALL), 2);
    assert!(diags.has_failed());
}

#[test]
fn clear_resets_dedup_state() {
    let mut diags = DiagnosticManager::default();
    diags.push(Ticket::PARSE, msg("x"));
    diags.clear(Ticket::PARSE);
    assert!(diags.push(Ticket::PARSE, msg("x")));
}

#[test]
fn unknown_ticket_counts_zero() {
    let mut diags = DiagnosticManager::default();
    assert_eq!(diags.count(Ticket::new(42)), 0);
    assert_eq!(diags.clear(Ticket::new(42)), 0);
}

#[test]
fn fatal_is_detected() {
    let mut diags = DiagnosticManager::default();
    assert!(!diags.has_fatal());
    diags.push(
        Ticket::CONVERT,
        DiagMessage::new(Severity::FatalError, IssueCode::InternalError, "oops"),
    );
    assert!(diags.has_fatal());
    assert!(diags.has_failed());
}

#[test]
fn scoped_ticket_restores_previous_default() {
    let mut diags = DiagnosticManager::default();
    assert_eq!(diags.current(), Ticket::CONVERT);
    {
        let mut scoped = diags.scoped(Ticket::PARSE);
        scoped.emit(msg("inside"));
        assert_eq!(scoped.current(), Ticket::PARSE);
    }
    assert_eq!(diags.current(), Ticket::CONVERT);
    assert_eq!(diags.count(Ticket::PARSE), 1);
    diags.emit(msg("outside"));
    assert_eq!(diags.count(Ticket::CONVERT), 1);
}

#[test]
fn render_counts_and_forwards_severity() {
    let mut diags = DiagnosticManager::default();
    diags.push(Ticket::PARSE, msg("e"));
    diags.push(Ticket::CONVERT, warn("w"));

    let mut seen = Vec::new();
    let n = diags.render(Ticket::ALL, DiagFormat::CodeText, None, &mut |text, sev| {
        seen.push((text.to_string(), sev));
    });
    assert_eq!(n, 2);
    // Channels render in ticket order: CONVERT (1) before PARSE (2).
    assert_eq!(
        seen,
        vec![
            ("0: w".to_string(), Severity::Warn),
            ("1001: e".to_string(), Severity::Error),
        ]
    );
}

/// Every location is on row 1, column = raw tag.
struct OneLine;

impl SourceView for OneLine {
    fn filename(&self) -> &str {
        "one.q"
    }

    fn line(&self, loc: Location) -> Option<u32> {
        loc.is_known().then_some(1)
    }

    fn col(&self, loc: Location) -> Option<u32> {
        loc.is_known().then(|| loc.raw())
    }

    fn snippet(&mut self, _loc: Location) -> Option<(String, u32)> {
        None
    }

    fn rect(&mut self, _: u32, _: u32, _: u32, _: u32, _: char) -> Option<Vec<String>> {
        None
    }
}

#[test]
fn render_reuses_one_source_for_every_message() {
    let mut diags = DiagnosticManager::default();
    diags.push(Ticket::PARSE, msg("a"));
    diags.push(Ticket::PARSE, msg("b"));

    let mut view = OneLine;
    let mut seen = Vec::new();
    let n = diags.render(Ticket::PARSE, DiagFormat::CodeLoc, Some(&mut view), &mut |text, _| {
        seen.push(text.to_string());
    });
    assert_eq!(n, 2);
    assert_eq!(seen, ["1001@one.q:1:1", "1001@one.q:1:1"]);
}

#[test]
fn concurrent_pushes_dedup_under_lock() {
    let diags = ConcurrentDiagnostics::default();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for i in 0..10 {
                    diags.push(Ticket::PARSE, msg(&format!("m{i}")));
                }
            });
        }
    });
    assert_eq!(diags.count(Ticket::PARSE), 10);
    assert!(diags.has_failed());
    let inner = diags.into_inner();
    assert_eq!(inner.count(Ticket::ALL), 10);
}
