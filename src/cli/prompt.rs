//! Operator prompts: action selection and amount entry.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::U256;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};

pub const INVALID_ACTION_HINT: &str =
    "操作无效。使用“1”表示分发，使用“2”表示归集. / Invalid action. Use \"1\" to distribute, \"2\" to collect.";
pub const INVALID_AMOUNT_HINT: &str =
    "请提供有效金额进行分配. / Please provide a valid amount to distribute.";

/// Operation selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Distribute,
    Collect,
}

impl Action {
    /// Accepts the numeric codes and the operation names.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "distribute" => Some(Action::Distribute),
            "2" | "collect" => Some(Action::Collect),
            _ => None,
        }
    }
}

/// A fully specified operation, ready to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Send this many wei to every collection wallet.
    Distribute(U256),
    Collect,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("'{0}' is not a valid amount")]
    Invalid(String),

    #[error("amount must be greater than zero")]
    NonPositive,
}

/// Why no command was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown action '{0}'")]
    Action(String),

    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Decimal places of one ether in wei.
const ETHER_DECIMALS: usize = 18;

/// Parse a decimal ether amount into wei. Only strictly positive values pass,
/// and nothing finer than one wei.
pub fn parse_amount(input: &str) -> Result<U256, AmountError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let invalid = || AmountError::Invalid(input.to_string());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }
    if let Some((_, fraction)) = digits.split_once('.') {
        if fraction.len() > ETHER_DECIMALS {
            return Err(invalid());
        }
    }

    let value = parse_ether(digits).map_err(|_| invalid())?;
    if negative || value.is_zero() {
        return Err(AmountError::NonPositive);
    }
    Ok(value)
}

/// Print `prompt` and read one line. End of input reads as an empty answer.
async fn ask<R>(input: &mut R, prompt: &str) -> std::io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    input.read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

/// Ask for the operation and, for distribute, the amount.
///
/// Pre-answered values skip their prompt but are validated the same way.
/// Invalid answers print a hint and come back as `InputError`; there is no
/// second attempt.
pub async fn choose_command<R>(
    input: &mut R,
    preset_action: Option<&str>,
    preset_amount: Option<&str>,
) -> std::io::Result<Result<Command, InputError>>
where
    R: AsyncBufRead + Unpin,
{
    let answer = match preset_action {
        Some(action) => action.to_string(),
        None => {
            println!("选择操作 / Choose an action:");
            println!("1 - 分发ETH（BNB） / distribute");
            println!("2 - 归集ETH（BNB） / collect");
            ask(input, "输入操作编号 / Enter action number: ").await?
        }
    };

    let action = match Action::parse(&answer) {
        Some(action) => action,
        None => {
            println!("{}", INVALID_ACTION_HINT);
            return Ok(Err(InputError::Action(answer)));
        }
    };

    if action == Action::Collect {
        return Ok(Ok(Command::Collect));
    }

    let raw_amount = match preset_amount {
        Some(amount) => amount.to_string(),
        None => {
            ask(
                input,
                "输入要分配给每个钱包的 ETH(BNB) 数量 / Amount of ETH (BNB) per wallet: ",
            )
            .await?
        }
    };

    Ok(match parse_amount(&raw_amount) {
        Ok(amount) => Ok(Command::Distribute(amount)),
        Err(e) => {
            tracing::debug!(input = %raw_amount, error = %e, "Amount rejected");
            println!("{}", INVALID_AMOUNT_HINT);
            Err(InputError::Amount(e))
        }
    })
}
