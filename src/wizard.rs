//! Wizard state machines for the multi-step chat flows.
//!
//! Each flow is a named-state machine rather than a switch on a step
//! counter: a step knows its prompt, how to validate and store one input,
//! and which step follows. The text entry point (message handler) and the
//! button entry point (callback handler, e.g. star-rating buttons) both go
//! through [`AddTipStep::apply`], so the two can never disagree on ordering.

use crate::models::NewGame;

/// Purchase limit applied to every tip created through the bot
pub const DEFAULT_PURCHASE_LIMIT: u32 = 100;

/// Validation failure for a single wizard input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    Empty,
    NotANumber,
    OutOfRange { min: u32, max: u32 },
}

impl WizardError {
    /// Re-prompt text shown to the user; the step is not advanced
    pub fn user_message(&self) -> String {
        match self {
            WizardError::Empty => "❌ That can't be empty. Please try again:".to_string(),
            WizardError::NotANumber => "❌ Please enter a number:".to_string(),
            WizardError::OutOfRange { min, max } => {
                format!("❌ Please enter a number between {min} and {max}:")
            }
        }
    }
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardError::Empty => write!(f, "empty input"),
            WizardError::NotANumber => write!(f, "not a number"),
            WizardError::OutOfRange { min, max } => write!(f, "out of range {min}..{max}"),
        }
    }
}

impl std::error::Error for WizardError {}

/// Partially collected tip listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TipDraft {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub odd_ratio: Option<f64>,
    pub image: Option<String>,
    pub confidence: Option<u8>,
    pub duration_mins: Option<u64>,
    pub betting_sites: Option<Vec<String>>,
    pub content: Option<String>,
}

impl TipDraft {
    /// Convert the accumulated fields into the backend payload.
    ///
    /// Returns `None` if a required field is missing, which can only happen
    /// on a programming error since every step stores its field before
    /// advancing. The image is genuinely optional (skip button).
    pub fn into_new_game(self) -> Option<NewGame> {
        Some(NewGame {
            tip_title: self.title?,
            tip_price: self.price?,
            odd_ratio: self.odd_ratio?,
            image: self.image,
            confidence_level: self.confidence?,
            duration: self.duration_mins?,
            betting_sites: self.betting_sites?,
            content_after_purchase: self.content?,
            purchase_limit: DEFAULT_PURCHASE_LIMIT,
        })
    }
}

/// Named steps of the add-tip wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddTipStep {
    Title,
    Price,
    OddRatio,
    ImageUrl,
    Confidence,
    Duration,
    BettingSites,
    Content,
}

impl AddTipStep {
    pub const FIRST: AddTipStep = AddTipStep::Title;

    /// The step following this one; `None` after the last step
    pub fn next(self) -> Option<AddTipStep> {
        match self {
            AddTipStep::Title => Some(AddTipStep::Price),
            AddTipStep::Price => Some(AddTipStep::OddRatio),
            AddTipStep::OddRatio => Some(AddTipStep::ImageUrl),
            AddTipStep::ImageUrl => Some(AddTipStep::Confidence),
            AddTipStep::Confidence => Some(AddTipStep::Duration),
            AddTipStep::Duration => Some(AddTipStep::BettingSites),
            AddTipStep::BettingSites => Some(AddTipStep::Content),
            AddTipStep::Content => None,
        }
    }

    /// Prompt sent when this step becomes active
    pub fn prompt(self) -> &'static str {
        match self {
            AddTipStep::Title => "🎮 Enter the Tip Title:",
            AddTipStep::Price => "💰 Enter the Price of the tip:",
            AddTipStep::OddRatio => "📈 Enter the Odd Ratio (e.g. 2.5):",
            AddTipStep::ImageUrl => "🖼️ Enter the Image URL, or press Skip:",
            AddTipStep::Confidence => "🔥 Pick the Confidence Level (1-5):",
            AddTipStep::Duration => "⏱️ Enter the Duration (in minutes):",
            AddTipStep::BettingSites => {
                "🏦 Enter the Betting Sites separated by commas (e.g. Bet9ja,1xbet):"
            }
            AddTipStep::Content => "📝 Enter the Content After Purchase:",
        }
    }

    /// Validate one input and store it into the draft.
    ///
    /// On error nothing is stored and the caller re-prompts without
    /// advancing.
    pub fn apply(self, input: &str, draft: &mut TipDraft) -> Result<(), WizardError> {
        let input = input.trim();
        match self {
            AddTipStep::Title => {
                draft.title = Some(required_text(input)?);
            }
            AddTipStep::Price => {
                draft.price = Some(parse_amount(input)?);
            }
            AddTipStep::OddRatio => {
                draft.odd_ratio = Some(parse_amount(input)?);
            }
            AddTipStep::ImageUrl => {
                draft.image = Some(required_text(input)?);
            }
            AddTipStep::Confidence => {
                let level: u8 = input.parse().map_err(|_| WizardError::NotANumber)?;
                if !(1..=5).contains(&level) {
                    return Err(WizardError::OutOfRange { min: 1, max: 5 });
                }
                draft.confidence = Some(level);
            }
            AddTipStep::Duration => {
                let minutes: u64 = input.parse().map_err(|_| WizardError::NotANumber)?;
                if minutes == 0 {
                    return Err(WizardError::OutOfRange { min: 1, max: u32::MAX });
                }
                draft.duration_mins = Some(minutes);
            }
            AddTipStep::BettingSites => {
                let sites: Vec<String> = input
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if sites.is_empty() {
                    return Err(WizardError::Empty);
                }
                draft.betting_sites = Some(sites);
            }
            AddTipStep::Content => {
                draft.content = Some(required_text(input)?);
            }
        }
        Ok(())
    }
}

/// The wizard a chat is currently inside, if any
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    AddTip { step: AddTipStep, draft: TipDraft },
    AddBalance { user_id: String },
    Broadcast,
    Deposit { amount: Option<f64> },
}

impl Flow {
    /// Fresh add-tip wizard positioned at the first step
    pub fn add_tip() -> Flow {
        Flow::AddTip {
            step: AddTipStep::FIRST,
            draft: TipDraft::default(),
        }
    }
}

/// Parse a strictly positive amount (prices, odds, deposits)
pub fn parse_amount(input: &str) -> Result<f64, WizardError> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| WizardError::NotANumber)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(WizardError::NotANumber);
    }
    Ok(value)
}

fn required_text(input: &str) -> Result<String, WizardError> {
    if input.is_empty() {
        Err(WizardError::Empty)
    } else {
        Ok(input.to_string())
    }
}
