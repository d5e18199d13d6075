use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use crate::domain::models::{menu::Menu, staff::Staff};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    Menu,
    Staff,
    DateTime,
    Confirm,
    Submitted,
}

#[derive(Debug, Clone)]
pub enum BookingAction {
    SelectMenu(Menu),
    SelectStaff(Staff),
    SelectDate(NaiveDate),
    SelectTime(NaiveTime),
    Next,
    Back,
    Submit,
}

impl BookingAction {
    fn name(&self) -> &'static str {
        match self {
            BookingAction::SelectMenu(_) => "select menu",
            BookingAction::SelectStaff(_) => "select staff",
            BookingAction::SelectDate(_) => "select date",
            BookingAction::SelectTime(_) => "select time",
            BookingAction::Next => "next",
            BookingAction::Back => "back",
            BookingAction::Submit => "submit",
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WizardError {
    #[error("cannot {action} during the {step:?} step")]
    WrongStep { action: &'static str, step: BookingStep },
    #[error("{0} is required")]
    MissingSelection(&'static str),
    #[error("already at the first step")]
    AtFirstStep,
    #[error("booking was already submitted")]
    AlreadySubmitted,
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Selections survive moving back and forth between steps.
#[derive(Debug, Clone)]
pub struct BookingSession {
    pub step: BookingStep,
    pub menu: Option<Menu>,
    pub staff: Option<Staff>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

/// Everything the write path needs, available once the session is submitted.
#[derive(Debug, Clone)]
pub struct BookingSelection {
    pub menu: Menu,
    pub staff: Staff,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Default for BookingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingSession {
    pub fn new() -> Self {
        Self { step: BookingStep::Menu, menu: None, staff: None, date: None, time: None }
    }

    pub fn selection(&self) -> Option<BookingSelection> {
        if self.step != BookingStep::Submitted {
            return None;
        }
        Some(BookingSelection {
            menu: self.menu.clone()?,
            staff: self.staff.clone()?,
            date: self.date?,
            time: self.time?,
        })
    }
}

pub fn advance(mut session: BookingSession, action: BookingAction) -> Result<BookingSession, WizardError> {
    use BookingStep as S;

    if session.step == S::Submitted {
        return Err(WizardError::AlreadySubmitted);
    }

    let wrong_step = |action: &BookingAction, step| WizardError::WrongStep { action: action.name(), step };

    match (session.step, action) {
        (S::Menu, BookingAction::SelectMenu(menu)) => session.menu = Some(menu),
        (S::Staff, BookingAction::SelectStaff(staff)) => session.staff = Some(staff),
        (S::DateTime, BookingAction::SelectDate(date)) => session.date = Some(date),
        (S::DateTime, BookingAction::SelectTime(time)) => session.time = Some(time),

        (S::Menu, BookingAction::Next) => {
            session.menu.as_ref().ok_or(WizardError::MissingSelection("menu"))?;
            session.step = S::Staff;
        }
        (S::Staff, BookingAction::Next) => {
            session.staff.as_ref().ok_or(WizardError::MissingSelection("staff"))?;
            session.step = S::DateTime;
        }
        (S::DateTime, BookingAction::Next) => {
            session.date.ok_or(WizardError::MissingSelection("date"))?;
            session.time.ok_or(WizardError::MissingSelection("time"))?;
            session.step = S::Confirm;
        }

        (S::Menu, BookingAction::Back) => return Err(WizardError::AtFirstStep),
        (S::Staff, BookingAction::Back) => session.step = S::Menu,
        (S::DateTime, BookingAction::Back) => session.step = S::Staff,
        (S::Confirm, BookingAction::Back) => session.step = S::DateTime,

        (S::Confirm, BookingAction::Submit) => session.step = S::Submitted,

        (step, action) => return Err(wrong_step(&action, step)),
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Menu {
        Menu::new("Cut".into(), 4000, 60, String::new(), 1)
    }

    fn staff() -> Staff {
        Staff::new("Yamada".into(), "stylist".into(), String::new(), None, 1)
    }

    fn run(actions: Vec<BookingAction>) -> Result<BookingSession, WizardError> {
        actions.into_iter().try_fold(BookingSession::new(), advance)
    }

    #[test]
    fn walks_forward_to_submission() {
        let session = run(vec![
            BookingAction::SelectMenu(menu()),
            BookingAction::Next,
            BookingAction::SelectStaff(staff()),
            BookingAction::Next,
            BookingAction::SelectDate(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()),
            BookingAction::SelectTime(NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
            BookingAction::Next,
            BookingAction::Submit,
        ]).unwrap();

        assert_eq!(session.step, BookingStep::Submitted);
        let selection = session.selection().unwrap();
        assert_eq!(selection.menu.name, "Cut");
        assert_eq!(selection.staff.name, "Yamada");
    }

    #[test]
    fn next_requires_current_selection() {
        assert_eq!(run(vec![BookingAction::Next]).unwrap_err(), WizardError::MissingSelection("menu"));

        let err = run(vec![
            BookingAction::SelectMenu(menu()),
            BookingAction::Next,
            BookingAction::SelectStaff(staff()),
            BookingAction::Next,
            BookingAction::SelectDate(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()),
            BookingAction::Next,
        ]).unwrap_err();
        assert_eq!(err, WizardError::MissingSelection("time"));
    }

    #[test]
    fn back_keeps_later_selections() {
        let session = run(vec![
            BookingAction::SelectMenu(menu()),
            BookingAction::Next,
            BookingAction::SelectStaff(staff()),
            BookingAction::Next,
            BookingAction::Back,
            BookingAction::Back,
        ]).unwrap();

        assert_eq!(session.step, BookingStep::Menu);
        assert!(session.staff.is_some());

        // Staff is still selected, so Next twice lands on the date step again.
        let session = advance(advance(session, BookingAction::Next).unwrap(), BookingAction::Next).unwrap();
        assert_eq!(session.step, BookingStep::DateTime);
    }

    #[test]
    fn rejects_out_of_step_actions() {
        assert_eq!(run(vec![BookingAction::Back]).unwrap_err(), WizardError::AtFirstStep);
        assert!(matches!(
            run(vec![BookingAction::SelectStaff(staff())]).unwrap_err(),
            WizardError::WrongStep { step: BookingStep::Menu, .. }
        ));
        assert!(matches!(run(vec![BookingAction::Submit]).unwrap_err(), WizardError::WrongStep { .. }));
    }

    #[test]
    fn submitted_session_is_terminal() {
        let mut session = BookingSession::new();
        session.step = BookingStep::Submitted;
        assert_eq!(advance(session, BookingAction::Back).unwrap_err(), WizardError::AlreadySubmitted);
    }
}
