use anyhow::{ensure, Result};
use parking_lot::Mutex;
use tracing::info;

use crate::db::database::Database;

/// Fixed storage key for the balance, kept from the original app.
pub const CREDITS_KEY: &str = "credits";

/// Persistence port for the balance. The value travels as its decimal
/// string form; interpretation belongs to the ledger.
#[allow(async_fn_in_trait)]
pub trait CreditStore {
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, value: &str) -> Result<()>;
}

pub struct SqliteCreditStore {
    db: Database,
}

impl SqliteCreditStore {
    pub fn new(db: Database) -> Self {
        SqliteCreditStore { db }
    }
}

impl CreditStore for SqliteCreditStore {
    async fn load(&self) -> Result<Option<String>> {
        self.db.get_state(CREDITS_KEY).await
    }

    async fn save(&self, value: &str) -> Result<()> {
        self.db.set_state(CREDITS_KEY, value).await
    }
}

#[derive(Default)]
pub struct MemoryCreditStore {
    value: Mutex<Option<String>>,
}

impl CreditStore for MemoryCreditStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.value.lock().clone())
    }

    async fn save(&self, value: &str) -> Result<()> {
        *self.value.lock() = Some(value.to_string());
        Ok(())
    }
}

/// Non-negative balance with two bounded transitions. Every mutation is
/// persisted before the new balance is returned. Not safe under
/// concurrent callers; the CLI runs one operation at a time.
pub struct CreditLedger<S: CreditStore> {
    store: S,
    balance: i64,
}

impl<S: CreditStore> CreditLedger<S> {
    /// Reads the persisted balance once. A missing or unparseable value
    /// counts as a first run and resets to `starting_credits`.
    pub async fn open(store: S, starting_credits: i64) -> Result<Self> {
        let stored = store.load().await?;
        let parsed = stored
            .as_deref()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|balance| *balance >= 0);

        let balance = match parsed {
            Some(balance) => balance,
            None => {
                if stored.is_some() {
                    info!("Stored credit balance was unreadable, resetting to {starting_credits}");
                }
                store.save(&starting_credits.to_string()).await?;
                starting_credits
            }
        };

        Ok(CreditLedger { store, balance })
    }

    pub fn current(&self) -> i64 {
        self.balance
    }

    /// Decrements by one, floored at zero. Spending at zero persists
    /// zero and returns zero.
    pub async fn spend(&mut self) -> Result<i64> {
        self.balance = (self.balance - 1).max(0);
        self.store.save(&self.balance.to_string()).await?;
        Ok(self.balance)
    }

    pub async fn grant(&mut self, amount: i64) -> Result<i64> {
        ensure!(amount > 0, "credit grant must be positive, got {amount}");
        self.balance += amount;
        self.store.save(&self.balance.to_string()).await?;
        Ok(self.balance)
    }
}

/// Simulated top-up plans, mirroring the original pricing tiers. Only
/// the credit grant is real; no payment is processed.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    pub credits: i64,
    pub price_usd: u32,
}

pub const PLANS: [Plan; 3] = [
    Plan {
        id: "starter",
        name: "Starter",
        credits: 10,
        price_usd: 9,
    },
    Plan {
        id: "pro",
        name: "Pro",
        credits: 50,
        price_usd: 29,
    },
    Plan {
        id: "business",
        name: "Business",
        credits: 200,
        price_usd: 99,
    },
];

pub fn find_plan(id: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|plan| plan.id == id.trim().to_lowercase())
}
