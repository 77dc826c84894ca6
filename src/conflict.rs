//! Ground-time conflict analysis.
//!
//! Pure evaluation of the gap between two chronologically adjacent legs on
//! the same tail against the directional TAT table. Used by the constructor
//! and refiner for feasibility, by the swap validator for boundary checks,
//! and by the interactive layer to annotate any assignment.
//!
//! Overlapping legs have no gap to evaluate and are reported separately as
//! overlaps, never as TAT violations.

use serde::{Deserialize, Serialize};

use crate::models::{FlightLeg, TatTable};

/// Extra minutes above the minimum under which a satisfied turnaround is
/// still flagged as tight. Reporting only; feasibility is exactly
/// `gap >= min_tat`.
pub const TIGHT_BUFFER_MINUTES: i64 = 5;

/// Result of evaluating the ground time between two same-tail legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapEvaluation {
    /// Ground time between arrival and next departure, in minutes.
    pub gap_minutes: i64,
    /// Scheduled minimum for this type and direction pair. 0 = unconstrained.
    pub min_tat: i64,
    /// Absolute (physical) minimum for the same pair.
    pub min_absolute: i64,
    /// Whether the gap satisfies the scheduled minimum.
    pub ok: bool,
}

/// Reporting classification of a gap evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapSeverity {
    /// Comfortably above the minimum, or unconstrained.
    Ok,
    /// Satisfies the minimum with less than the tight buffer to spare.
    Tight,
    /// Below the scheduled minimum.
    Violated,
}

impl GapEvaluation {
    /// Classifies this gap for warning display.
    ///
    /// The tight buffer is a reporting threshold only and never feeds back
    /// into engine feasibility decisions.
    pub fn severity(&self) -> GapSeverity {
        if !self.ok {
            GapSeverity::Violated
        } else if self.min_tat > 0 && self.gap_minutes < self.min_tat + TIGHT_BUFFER_MINUTES {
            GapSeverity::Tight
        } else {
            GapSeverity::Ok
        }
    }

    /// Whether the gap also satisfies the absolute minimum. A turnaround
    /// below this value cannot physically be flown.
    pub fn meets_absolute(&self) -> bool {
        self.min_absolute == 0 || self.gap_minutes >= self.min_absolute
    }
}

/// Evaluates the turnaround between `prev` (arriving) and `next`
/// (departing) for a tail of `aircraft_type`.
///
/// Returns `None` when there is no turnaround to evaluate: the stations
/// don't chain, or the legs truly overlap (negative gap).
pub fn evaluate_gap(
    prev: &FlightLeg,
    next: &FlightLeg,
    aircraft_type: &str,
    tat: &TatTable,
) -> Option<GapEvaluation> {
    if prev.arrival_station != next.departure_station {
        return None;
    }
    let gap_minutes = next.departure_instant() - prev.arrival_instant();
    if gap_minutes < 0 {
        return None;
    }

    let min_tat = tat.resolve(aircraft_type, prev.is_domestic(), next.is_domestic());
    let min_absolute = tat.resolve_absolute(aircraft_type, prev.is_domestic(), next.is_domestic());
    Some(GapEvaluation {
        gap_minutes,
        min_tat,
        min_absolute,
        ok: min_tat == 0 || gap_minutes >= min_tat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AircraftTypeTat, TatCase};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    fn table() -> TatTable {
        TatTable::new().with_type(
            AircraftTypeTat::new("DH8D", 25)
                .with_scheduled(TatCase::DomDom, 45)
                .with_absolute(TatCase::DomDom, 30),
        )
    }

    #[test]
    fn test_gap_below_minimum() {
        // Arrives 10:00 domestic, departs 10:40 domestic, same station.
        let prev = FlightLeg::new("A", "OSL", "TRD", 540, 600, date());
        let next = FlightLeg::new("B", "TRD", "BOO", 640, 700, date());

        let eval = evaluate_gap(&prev, &next, "DH8D", &table()).unwrap();
        assert_eq!(eval.gap_minutes, 40);
        assert_eq!(eval.min_tat, 45);
        assert!(!eval.ok);
        assert_eq!(eval.severity(), GapSeverity::Violated);
        assert!(eval.meets_absolute()); // 40 >= absolute 30
    }

    #[test]
    fn test_gap_satisfied() {
        let prev = FlightLeg::new("A", "OSL", "TRD", 540, 600, date());
        let next = FlightLeg::new("B", "TRD", "BOO", 660, 720, date());

        let eval = evaluate_gap(&prev, &next, "DH8D", &table()).unwrap();
        assert_eq!(eval.gap_minutes, 60);
        assert!(eval.ok);
        assert_eq!(eval.severity(), GapSeverity::Ok);
    }

    #[test]
    fn test_tight_classification_does_not_affect_ok() {
        // Gap 47 with minimum 45: ok, but within the 5-minute buffer.
        let prev = FlightLeg::new("A", "OSL", "TRD", 540, 600, date());
        let next = FlightLeg::new("B", "TRD", "BOO", 647, 707, date());

        let eval = evaluate_gap(&prev, &next, "DH8D", &table()).unwrap();
        assert!(eval.ok);
        assert_eq!(eval.severity(), GapSeverity::Tight);
    }

    #[test]
    fn test_station_mismatch_returns_none() {
        let prev = FlightLeg::new("A", "OSL", "TRD", 540, 600, date());
        let next = FlightLeg::new("B", "BGO", "OSL", 660, 720, date());
        assert!(evaluate_gap(&prev, &next, "DH8D", &table()).is_none());
    }

    #[test]
    fn test_overlap_returns_none() {
        let prev = FlightLeg::new("A", "OSL", "TRD", 540, 620, date());
        let next = FlightLeg::new("B", "TRD", "BOO", 600, 660, date());
        assert!(evaluate_gap(&prev, &next, "DH8D", &table()).is_none());
    }

    #[test]
    fn test_unconstrained_type_always_ok() {
        let prev = FlightLeg::new("A", "OSL", "TRD", 540, 600, date());
        let next = FlightLeg::new("B", "TRD", "BOO", 600, 660, date());

        let eval = evaluate_gap(&prev, &next, "E190", &table()).unwrap();
        assert_eq!(eval.gap_minutes, 0);
        assert_eq!(eval.min_tat, 0);
        assert!(eval.ok);
        assert_eq!(eval.severity(), GapSeverity::Ok);
    }

    #[test]
    fn test_directional_case_selection() {
        // International arrival into a domestic departure uses int→dom.
        let t = TatTable::new().with_type(
            AircraftTypeTat::new("B738", 30)
                .with_scheduled(TatCase::IntDom, 50)
                .with_scheduled(TatCase::DomDom, 35),
        );
        let prev = FlightLeg::new("A", "LHR", "OSL", 540, 660, date()).international();
        let next = FlightLeg::new("B", "OSL", "TRD", 700, 760, date());

        let eval = evaluate_gap(&prev, &next, "B738", &t).unwrap();
        assert_eq!(eval.min_tat, 50);
        assert!(!eval.ok); // gap 40 < 50
    }

    #[test]
    fn test_cross_midnight_gap() {
        // Arrival 23:50, departure 00:40 next day.
        let prev = FlightLeg::new("A", "OSL", "TRD", 1370, 1430, date());
        let next = FlightLeg::new("B", "TRD", "BOO", 40, 100, date().succ_opt().unwrap());

        let eval = evaluate_gap(&prev, &next, "DH8D", &table()).unwrap();
        assert_eq!(eval.gap_minutes, 50);
        assert!(eval.ok);
    }

    #[test]
    fn test_below_absolute_minimum() {
        let prev = FlightLeg::new("A", "OSL", "TRD", 540, 600, date());
        let next = FlightLeg::new("B", "TRD", "BOO", 620, 680, date());

        let eval = evaluate_gap(&prev, &next, "DH8D", &table()).unwrap();
        assert_eq!(eval.gap_minutes, 20);
        assert!(!eval.ok);
        assert!(!eval.meets_absolute());
    }
}
