//! Abyssal essence, the run currency

/// Non-negative currency counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbyssalEssence {
    balance: i32,
}

impl AbyssalEssence {
    pub fn new(balance: i32) -> Self {
        Self {
            balance: balance.max(0),
        }
    }

    pub fn balance(&self) -> i32 {
        self.balance
    }

    /// Add essence; non-positive amounts are ignored
    pub fn add(&mut self, amount: i32) {
        if amount > 0 {
            self.balance = self.balance.saturating_add(amount);
        }
    }

    /// Spend essence if the balance covers it
    pub fn spend(&mut self, amount: i32) -> bool {
        if amount <= 0 || amount > self.balance {
            return false;
        }
        self.balance -= amount;
        true
    }

    pub fn can_afford(&self, amount: i32) -> bool {
        amount > 0 && amount <= self.balance
    }

    pub fn reset(&mut self) {
        self.balance = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_ignores_negative() {
        let mut e = AbyssalEssence::default();
        e.add(10);
        e.add(-5);
        e.add(0);
        assert_eq!(e.balance(), 10);
    }

    #[test]
    fn test_spend_from_empty_fails() {
        let mut e = AbyssalEssence::default();
        assert!(!e.spend(1));
        assert_eq!(e.balance(), 0);
    }

    proptest! {
        #[test]
        fn test_spend_contract(balance in 0i32..1000, amount in -100i32..1200) {
            let mut e = AbyssalEssence::new(balance);
            let ok = e.spend(amount);
            if amount <= 0 || amount > balance {
                prop_assert!(!ok);
                prop_assert_eq!(e.balance(), balance);
            } else {
                prop_assert!(ok);
                prop_assert_eq!(e.balance(), balance - amount);
            }
            prop_assert!(e.balance() >= 0);
        }
    }
}
