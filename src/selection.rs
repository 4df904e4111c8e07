//! What a run does: process mode, chosen transactions, schedule and retries.

use std::collections::BTreeSet;
use std::fmt;

use bon::Builder;

use crate::error::InputError;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    TxAndClaim,
    TxOnly,
    ClaimOnly,
}

impl ProcessMode {
    pub const MENU: &'static str = "1. TX and Claim Task\n2. TX only\n3. Claim Task only";

    pub fn from_answer(answer: &str) -> Result<Self, InputError> {
        match answer.trim() {
            "1" => Ok(ProcessMode::TxAndClaim),
            "2" => Ok(ProcessMode::TxOnly),
            "3" => Ok(ProcessMode::ClaimOnly),
            other => Err(InputError::InvalidChoice {
                answer: other.to_string(),
                expected: "1, 2, 3".to_string(),
            }),
        }
    }

    pub fn executes_transactions(&self) -> bool {
        matches!(self, ProcessMode::TxAndClaim | ProcessMode::TxOnly)
    }

    pub fn claims_tasks(&self) -> bool {
        matches!(self, ProcessMode::TxAndClaim | ProcessMode::ClaimOnly)
    }
}

/// Transaction kinds, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TxKind {
    SendToSelf,
    WrapUnwrap,
    Wrap,
    Unwrap,
    SwapUsdt,
    SupplyUsdc,
    BorrowAndRepay,
    Borrow,
    Repay,
    SupplyUsdcRepeated,
}

impl TxKind {
    pub const ALL: [TxKind; 10] = [
        TxKind::SendToSelf,
        TxKind::WrapUnwrap,
        TxKind::Wrap,
        TxKind::Unwrap,
        TxKind::SwapUsdt,
        TxKind::SupplyUsdc,
        TxKind::BorrowAndRepay,
        TxKind::Borrow,
        TxKind::Repay,
        TxKind::SupplyUsdcRepeated,
    ];

    pub fn menu_number(&self) -> usize {
        TxKind::ALL.iter().position(|kind| kind == self).unwrap_or_default() + 1
    }

    pub fn from_menu_number(number: usize) -> Option<Self> {
        number.checked_sub(1).and_then(|i| TxKind::ALL.get(i).copied())
    }

    pub fn label(&self) -> &'static str {
        match self {
            TxKind::SendToSelf => "Send to self",
            TxKind::WrapUnwrap => "Wrap and Unwrap ETH",
            TxKind::Wrap => "Wrap ETH",
            TxKind::Unwrap => "Unwrap ETH",
            TxKind::SwapUsdt => "Swap USDT",
            TxKind::SupplyUsdc => "Supply USDC",
            TxKind::BorrowAndRepay => "Borrow and Repay",
            TxKind::Borrow => "Borrow only",
            TxKind::Repay => "Repay only",
            TxKind::SupplyUsdcRepeated => "Supply USDC repeatedly",
        }
    }

    pub fn menu() -> String {
        TxKind::ALL
            .iter()
            .map(|kind| format!("{}. {}", kind.menu_number(), kind.label()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxSelection(BTreeSet<TxKind>);

impl TxSelection {
    pub fn all() -> Self {
        Self(TxKind::ALL.into_iter().collect())
    }

    /// `all`, or comma separated menu numbers such as `1,3,5`. One bad entry
    /// rejects the whole answer.
    pub fn parse(answer: &str) -> Result<Self, InputError> {
        let answer = answer.trim().to_lowercase();
        if answer == "all" {
            return Ok(Self::all());
        }
        let mut kinds = BTreeSet::new();
        for choice in answer.split(',').map(str::trim) {
            let kind = choice
                .parse::<usize>()
                .ok()
                .and_then(TxKind::from_menu_number)
                .ok_or_else(|| InputError::InvalidSelection(answer.clone()))?;
            kinds.insert(kind);
        }
        Ok(Self(kinds))
    }

    pub fn contains(&self, kind: TxKind) -> bool {
        self.0.contains(&kind)
    }
}

impl fmt::Display for TxSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(TxKind::label).collect();
        write!(f, "{}", labels.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Sleep the configured delay between cycles.
    FixedDelay,
    /// Run once a day at the configured UTC time.
    DailyUtc,
}

impl ScheduleMode {
    pub const MENU: &'static str = "1. Use delay from config\n2. Auto process daily at the configured UTC time";

    pub fn from_answer(answer: &str) -> Result<Self, InputError> {
        match answer.trim() {
            "1" => Ok(ScheduleMode::FixedDelay),
            "2" => Ok(ScheduleMode::DailyUtc),
            other => Err(InputError::InvalidChoice {
                answer: other.to_string(),
                expected: "1, 2".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Builder)]
pub struct RunOptions {
    pub mode: ProcessMode,
    #[builder(default)]
    pub transactions: TxSelection,
    #[builder(default = false)]
    pub use_proxy: bool,
    pub schedule: ScheduleMode,
    #[builder(default = RetryPolicy::Attempts(1))]
    pub retry: RetryPolicy,
    /// Stop after the first cycle.
    #[builder(default = false)]
    pub once: bool,
}

impl RunOptions {
    /// Whether `kind` runs this cycle; nothing runs when the mode skips TX.
    pub fn runs(&self, kind: TxKind) -> bool {
        self.mode.executes_transactions() && self.transactions.contains(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_process_modes() {
        assert_eq!(ProcessMode::from_answer("1").unwrap(), ProcessMode::TxAndClaim);
        assert!(ProcessMode::from_answer(" 2 ").unwrap().executes_transactions());
        assert!(!ProcessMode::from_answer("2").unwrap().claims_tasks());
        assert!(ProcessMode::from_answer("3").unwrap().claims_tasks());
        assert!(ProcessMode::from_answer("4").is_err());
    }

    #[test]
    fn parses_comma_separated_selection() {
        let selection = TxSelection::parse("1, 3,10").unwrap();
        assert!(selection.contains(TxKind::SendToSelf));
        assert!(selection.contains(TxKind::Wrap));
        assert!(selection.contains(TxKind::SupplyUsdcRepeated));
        assert!(!selection.contains(TxKind::WrapUnwrap));
    }

    #[test]
    fn all_selects_every_kind() {
        let selection = TxSelection::parse("ALL").unwrap();
        assert!(TxKind::ALL.iter().all(|kind| selection.contains(*kind)));
    }

    #[test]
    fn one_bad_choice_rejects_the_answer() {
        assert!(TxSelection::parse("1,11").is_err());
        assert!(TxSelection::parse("0").is_err());
        assert!(TxSelection::parse("1,,2").is_err());
        assert!(TxSelection::parse("").is_err());
    }

    #[test]
    fn menu_numbers_round_trip() {
        for kind in TxKind::ALL {
            assert_eq!(TxKind::from_menu_number(kind.menu_number()), Some(kind));
        }
        assert!(TxKind::menu().starts_with("1. Send to self\n2. Wrap and Unwrap ETH"));
    }

    #[test]
    fn claim_only_runs_no_transactions() {
        let options = RunOptions::builder()
            .mode(ProcessMode::ClaimOnly)
            .transactions(TxSelection::all())
            .schedule(ScheduleMode::FixedDelay)
            .build();
        assert!(!options.runs(TxKind::SendToSelf));
        assert_eq!(options.retry, RetryPolicy::Attempts(1));
    }
}
