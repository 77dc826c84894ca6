//! Built-in operator rules.
//!
//! # Categories
//!
//! - **Capability (hard)**: INTL, EMBARGO
//! - **Workload (soft)**: MAXLEGS
//! - **Positioning (soft)**: HOMEBASE

use std::collections::HashMap;

use super::{Enforcement, RotationContext, ScheduleRule, TriggeredRule};
use crate::models::{AssignableAircraft, FlightLeg};

/// Aircraft not equipped for international operation cannot take an
/// international leg. Hard.
#[derive(Debug, Clone, Copy)]
pub struct InternationalCapability;

impl ScheduleRule for InternationalCapability {
    fn name(&self) -> &'static str {
        "international-capability"
    }

    fn evaluate(
        &self,
        flight: &FlightLeg,
        aircraft: &AssignableAircraft,
        _context: &RotationContext<'_>,
    ) -> Option<TriggeredRule> {
        if flight.international && !aircraft.international_capable {
            return Some(TriggeredRule {
                rule: self.name().to_string(),
                enforcement: Enforcement::Hard,
                message: format!(
                    "{} is not equipped for international sector {}",
                    aircraft.registration, flight.number
                ),
            });
        }
        None
    }

    fn description(&self) -> &'static str {
        "International sectors require internationally equipped aircraft"
    }
}

/// Listed registrations may not serve listed stations (ETOPS, noise, or
/// performance restrictions). Hard.
#[derive(Debug, Clone, Default)]
pub struct RegistrationEmbargo {
    /// Station → registrations barred from serving it.
    barred: HashMap<String, Vec<String>>,
}

impl RegistrationEmbargo {
    /// Creates an empty embargo rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bars a registration from a station (departure or arrival).
    pub fn with_embargo(
        mut self,
        station: impl Into<String>,
        registration: impl Into<String>,
    ) -> Self {
        self.barred
            .entry(station.into())
            .or_default()
            .push(registration.into());
        self
    }

    fn is_barred(&self, station: &str, registration: &str) -> bool {
        self.barred
            .get(station)
            .is_some_and(|regs| regs.iter().any(|r| r == registration))
    }
}

impl ScheduleRule for RegistrationEmbargo {
    fn name(&self) -> &'static str {
        "registration-embargo"
    }

    fn evaluate(
        &self,
        flight: &FlightLeg,
        aircraft: &AssignableAircraft,
        _context: &RotationContext<'_>,
    ) -> Option<TriggeredRule> {
        let station = [&flight.departure_station, &flight.arrival_station]
            .into_iter()
            .find(|station| self.is_barred(station, &aircraft.registration))?;
        Some(TriggeredRule {
            rule: self.name().to_string(),
            enforcement: Enforcement::Hard,
            message: format!("{} is barred from {}", aircraft.registration, station),
        })
    }

    fn description(&self) -> &'static str {
        "Station restrictions bar specific registrations"
    }
}

/// Penalizes every leg beyond a per-tail daily cap. Soft.
#[derive(Debug, Clone, Copy)]
pub struct MaxDailyLegs {
    /// Legs a tail may fly per day without penalty.
    pub cap: usize,
    /// Penalty per leg over the cap.
    pub penalty_per_leg: i64,
}

impl MaxDailyLegs {
    /// Creates the rule with a cap and per-leg penalty.
    pub fn new(cap: usize, penalty_per_leg: i64) -> Self {
        Self {
            cap,
            penalty_per_leg,
        }
    }
}

impl ScheduleRule for MaxDailyLegs {
    fn name(&self) -> &'static str {
        "max-daily-legs"
    }

    fn evaluate(
        &self,
        flight: &FlightLeg,
        aircraft: &AssignableAircraft,
        context: &RotationContext<'_>,
    ) -> Option<TriggeredRule> {
        let with_this = context.legs_today + 1;
        if with_this <= self.cap {
            return None;
        }
        let excess = (with_this - self.cap) as i64;
        Some(TriggeredRule {
            rule: self.name().to_string(),
            enforcement: Enforcement::Soft {
                penalty: excess * self.penalty_per_leg,
            },
            message: format!(
                "{} legs on {} exceed the daily cap of {} for {}",
                with_this, flight.date, self.cap, aircraft.registration
            ),
        })
    }

    fn description(&self) -> &'static str {
        "Caps legs per tail per day"
    }
}

/// Penalizes a tail whose last leg of the day does not end at its home
/// base. Soft; applies only when the evaluated leg is the last known leg.
#[derive(Debug, Clone, Copy)]
pub struct HomeBaseFinish {
    /// Penalty for finishing away from base.
    pub penalty: i64,
}

impl HomeBaseFinish {
    /// Creates the rule with a fixed penalty.
    pub fn new(penalty: i64) -> Self {
        Self { penalty }
    }
}

impl ScheduleRule for HomeBaseFinish {
    fn name(&self) -> &'static str {
        "home-base-finish"
    }

    fn evaluate(
        &self,
        flight: &FlightLeg,
        aircraft: &AssignableAircraft,
        context: &RotationContext<'_>,
    ) -> Option<TriggeredRule> {
        let home = aircraft.home_base.as_deref()?;
        if context.next_leg.is_some() || flight.arrival_station == home {
            return None;
        }
        Some(TriggeredRule {
            rule: self.name().to_string(),
            enforcement: Enforcement::Soft {
                penalty: self.penalty,
            },
            message: format!(
                "{} finishes at {} instead of home base {}",
                aircraft.registration, flight.arrival_station, home
            ),
        })
    }

    fn description(&self) -> &'static str {
        "Tails should end the day at their home base"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    fn domestic_leg() -> FlightLeg {
        FlightLeg::new("F1", "OSL", "TRD", 480, 540, date()).with_number("WX612")
    }

    #[test]
    fn test_international_capability() {
        let rule = InternationalCapability;
        let intl = FlightLeg::new("F1", "OSL", "LHR", 480, 600, date()).international();
        let capable = AssignableAircraft::new("LN-WDA", "DH8D");
        let restricted = AssignableAircraft::new("LN-WDB", "DH8D").domestic_only();
        let ctx = RotationContext::default();

        assert!(rule.evaluate(&intl, &capable, &ctx).is_none());
        let triggered = rule.evaluate(&intl, &restricted, &ctx).unwrap();
        assert_eq!(triggered.enforcement, Enforcement::Hard);

        // Domestic legs never trigger.
        assert!(rule.evaluate(&domestic_leg(), &restricted, &ctx).is_none());
    }

    #[test]
    fn test_registration_embargo() {
        let rule = RegistrationEmbargo::new().with_embargo("TRD", "LN-WDA");
        let barred = AssignableAircraft::new("LN-WDA", "DH8D");
        let clear = AssignableAircraft::new("LN-WDB", "DH8D");
        let ctx = RotationContext::default();

        // TRD is the arrival station of the leg.
        let triggered = rule.evaluate(&domestic_leg(), &barred, &ctx).unwrap();
        assert_eq!(triggered.enforcement, Enforcement::Hard);
        assert!(triggered.message.contains("TRD"));

        assert!(rule.evaluate(&domestic_leg(), &clear, &ctx).is_none());
    }

    #[test]
    fn test_max_daily_legs() {
        let rule = MaxDailyLegs::new(4, 20);
        let aircraft = AssignableAircraft::new("LN-WDA", "DH8D");

        let under = RotationContext {
            legs_today: 3,
            ..Default::default()
        };
        assert!(rule.evaluate(&domestic_leg(), &aircraft, &under).is_none());

        let over = RotationContext {
            legs_today: 5,
            ..Default::default()
        };
        let triggered = rule.evaluate(&domestic_leg(), &aircraft, &over).unwrap();
        assert_eq!(triggered.enforcement, Enforcement::Soft { penalty: 40 });
    }

    #[test]
    fn test_home_base_finish() {
        let rule = HomeBaseFinish::new(30);
        let based = AssignableAircraft::new("LN-WDA", "DH8D").with_home_base("TRD");
        let unbased = AssignableAircraft::new("LN-WDB", "DH8D");
        let ctx = RotationContext::default();

        // Leg arrives TRD == home base → satisfied.
        assert!(rule.evaluate(&domestic_leg(), &based, &ctx).is_none());

        // Away arrival on the last known leg → penalty.
        let away = FlightLeg::new("F2", "TRD", "BOO", 600, 660, date());
        let triggered = rule.evaluate(&away, &based, &ctx).unwrap();
        assert_eq!(triggered.enforcement, Enforcement::Soft { penalty: 30 });

        // Not the last leg → no trigger.
        let next = domestic_leg();
        let mid_day = RotationContext {
            next_leg: Some(&next),
            ..Default::default()
        };
        assert!(rule.evaluate(&away, &based, &mid_day).is_none());

        // No home base configured → rule does not apply.
        assert!(rule.evaluate(&away, &unbased, &ctx).is_none());
    }
}
