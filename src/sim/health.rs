//! Clamped health stat

use serde::{Deserialize, Serialize};

/// Health of one combatant, always within `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthBar {
    max: f32,
    current: f32,
}

impl HealthBar {
    /// Full bar with the given maximum (negative maxima are treated as 0)
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { max, current: max }
    }

    pub fn damage(&mut self, amount: f32) -> &mut Self {
        self.current = (self.current - amount).clamp(0.0, self.max);
        self
    }

    pub fn heal(&mut self, amount: f32) -> &mut Self {
        self.current = (self.current + amount).clamp(0.0, self.max);
        self
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0.0
    }

    /// Renderers hide a full bar
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Remaining health as a 0-1 fraction (0 for a zero-max bar)
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 { self.current / self.max } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut bar = HealthBar::new(30.0);
        bar.damage(10.0);
        assert_eq!(bar.current(), 20.0);
        assert!(!bar.is_dead());
        bar.damage(1000.0);
        assert_eq!(bar.current(), 0.0);
        assert!(bar.is_dead());
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut bar = HealthBar::new(30.0);
        bar.damage(5.0).heal(100.0);
        assert_eq!(bar.current(), 30.0);
        assert!(bar.is_full());
    }

    #[test]
    fn test_dead_only_at_zero() {
        let mut bar = HealthBar::new(1.0);
        bar.damage(0.999);
        assert!(!bar.is_dead());
        bar.damage(0.001);
        assert!(bar.is_dead());
        bar.heal(0.5);
        assert!(!bar.is_dead());
        assert!((bar.fraction() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_negative_amounts_stay_in_range() {
        // A negative damage behaves like a heal, still clamped
        let mut bar = HealthBar::new(10.0);
        bar.damage(-50.0);
        assert_eq!(bar.current(), 10.0);
        bar.heal(-50.0);
        assert_eq!(bar.current(), 0.0);
    }
}
