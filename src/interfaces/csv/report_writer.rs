use crate::domain::ledger::Ledger;
use crate::domain::payment::Payment;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::io::Write;

/// Decimal places shown for money in reports.
pub const DISPLAY_DP: u32 = 2;

/// Writes balances and payments as CSV, naming participants.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// `participant,balance`, one row per roster entry.
    pub fn write_balances(&mut self, ledger: &Ledger) -> Result<()> {
        self.writer.write_record(["participant", "balance"])?;
        for (participant, balance) in ledger.participants().iter().zip(ledger.balances()) {
            let amount = display_amount(balance.value());
            self.writer
                .write_record([participant.name(), amount.as_str()])?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// `from,to,amount`, in settlement order.
    pub fn write_payments(&mut self, ledger: &Ledger, payments: &[Payment]) -> Result<()> {
        self.writer.write_record(["from", "to", "amount"])?;
        for payment in payments {
            let (from, to) = names(ledger, payment)?;
            let amount = display_amount(payment.amount);
            self.writer.write_record([from, to, amount.as_str()])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Plain sentences, one per payment: `Bob pays Alice 10.00 doubloons`.
pub fn write_payment_lines<W: Write>(
    mut sink: W,
    ledger: &Ledger,
    payments: &[Payment],
) -> Result<()> {
    for payment in payments {
        let (from, to) = names(ledger, payment)?;
        writeln!(
            sink,
            "{from} pays {to} {:.2} doubloons",
            payment.amount.round_dp(DISPLAY_DP)
        )?;
    }
    sink.flush()?;
    Ok(())
}

fn names<'a>(ledger: &'a Ledger, payment: &Payment) -> Result<(&'a str, &'a str)> {
    let participants = ledger.participants();
    let name = |index: usize| {
        participants
            .get(index)
            .map(|p| p.name())
            .ok_or(LedgerError::ParticipantOutOfRange {
                index,
                len: participants.len(),
            })
    };
    Ok((name(payment.from)?, name(payment.to)?))
}

fn display_amount(value: Decimal) -> String {
    value.round_dp(DISPLAY_DP).normalize().to_string()
}
