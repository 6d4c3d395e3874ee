//! Layout validation for hull structures.
//!
//! Pure functions that take a `Structure` and return validation errors.
//! The propagation search tolerates every problem reported here (it skips
//! or degrades the offending piece), so these checks are advisory: they
//! exist to catch authoring mistakes before they show up as odd muffling.

use std::collections::HashSet;

use crate::structure::Structure;

/// A structure validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

// ── A. References ───────────────────────────────────────────────────────

/// Check that every room an opening links actually exists.
pub fn check_opening_rooms_exist(structure: &Structure) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for o in structure.openings() {
        for room in o.linked_rooms() {
            if structure.room(room).is_none() {
                errors.push(ValidationError {
                    category: "references",
                    severity: Severity::Error,
                    message: format!("Opening #{} links non-existent room #{}", o.id.0, room.0),
                });
            }
        }
    }
    errors
}

/// Check that every opening a room lists actually exists and links back.
pub fn check_room_openings_exist(structure: &Structure) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for r in structure.rooms() {
        for &oid in &r.openings {
            match structure.opening(oid) {
                None => errors.push(ValidationError {
                    category: "references",
                    severity: Severity::Error,
                    message: format!("Room #{} lists non-existent opening #{}", r.id.0, oid.0),
                }),
                Some(o) if !o.links(r.id) => errors.push(ValidationError {
                    category: "references",
                    severity: Severity::Warning,
                    message: format!(
                        "Room #{} lists opening #{} which does not link back to it",
                        r.id.0, oid.0
                    ),
                }),
                Some(_) => {}
            }
        }
    }
    errors
}

// ── B. Opening geometry ─────────────────────────────────────────────────

/// Check for degenerate extents and out-of-range open-ness.
pub fn check_opening_geometry(structure: &Structure) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for o in structure.openings() {
        if !o.rect.is_well_formed() {
            errors.push(ValidationError {
                category: "opening_geometry",
                severity: Severity::Warning,
                message: format!(
                    "Opening #{} has a degenerate extent {}×{} at ({}, {})",
                    o.id.0, o.rect.width, o.rect.height, o.rect.cx, o.rect.cy
                ),
            });
        }
        if !(0.0..=1.0).contains(&o.open) {
            errors.push(ValidationError {
                category: "opening_geometry",
                severity: Severity::Warning,
                message: format!("Opening #{} open-ness {} outside [0, 1]", o.id.0, o.open),
            });
        }
    }
    errors
}

// ── C. Connectivity ─────────────────────────────────────────────────────

/// Check that every room has at least one opening.
pub fn check_rooms_have_openings(structure: &Structure) -> Vec<ValidationError> {
    let mut linked: HashSet<_> = HashSet::new();
    for o in structure.openings() {
        linked.extend(o.linked_rooms());
    }

    structure
        .rooms()
        .iter()
        .filter(|r| r.openings.is_empty() && !linked.contains(&r.id))
        .map(|r| ValidationError {
            category: "connectivity",
            severity: Severity::Warning,
            message: format!("Room #{} has no openings", r.id.0),
        })
        .collect()
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all structure validations and return combined results.
pub fn validate_structure(structure: &Structure) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_opening_rooms_exist(structure));
    all.extend(check_room_openings_exist(structure));
    all.extend(check_opening_geometry(structure));
    all.extend(check_rooms_have_openings(structure));
    all
}
