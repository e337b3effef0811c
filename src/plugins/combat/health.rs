//! HP bookkeeping shared by every damageable entity kind.
//!
//! The pool is plain data: no ECS access, no side effects. Observers decide what to do
//! with the returned [`DamageOutcome`] (effects, flashes, stagger, cascade).

/// What a single damage application did to a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The pool was already dead; nothing changed.
    Ignored,
    /// Negative amount; nothing changed.
    Rejected,
    /// HP went down (or stayed put for a zero hit) and the pool is still alive.
    Wounded,
    /// This hit flipped the death latch.
    Killed,
}

impl DamageOutcome {
    /// The hit was applied and feedback should play.
    #[inline]
    pub fn landed(self) -> bool {
        matches!(self, Self::Wounded | Self::Killed)
    }
}

/// HP pool with a one-way death latch.
///
/// Invariant: `dead` flips false -> true exactly once, and no mutation is accepted after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPool {
    current: i32,
    max: i32,
    dead: bool,
}

impl HealthPool {
    pub fn new(max: i32) -> Self {
        Self { current: max, max, dead: false }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Apply `amount` of damage.
    ///
    /// HP is not clamped at zero: two 3-point hits on a 5-HP pool leave it at -1.
    pub fn absorb(&mut self, amount: i32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }
        if amount < 0 {
            return DamageOutcome::Rejected;
        }

        self.current -= amount;
        if self.current <= 0 {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Flip the latch without touching HP (cascade breaks).
    ///
    /// Returns `false` if the pool was already dead.
    pub fn force_kill(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        true
    }
}

/// Anything that owns a [`HealthPool`] the damage pipeline can drain.
pub trait Damageable {
    fn pool(&self) -> &HealthPool;
    fn pool_mut(&mut self) -> &mut HealthPool;

    #[inline]
    fn absorb(&mut self, amount: i32) -> DamageOutcome {
        self.pool_mut().absorb(amount)
    }

    #[inline]
    fn is_dead(&self) -> bool {
        self.pool().is_dead()
    }

    #[inline]
    fn hp(&self) -> i32 {
        self.pool().current()
    }
}
