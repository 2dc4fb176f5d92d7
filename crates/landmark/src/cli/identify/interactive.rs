//! Menu-driven follow-up questions after an image has been identified.

use dialoguer::{Confirm, Input, Select};
use landmark_core::{Explorer, Intent, Session, SessionState};

use super::types::OutputFormat;
use crate::cli::theme::{landmark_theme, print_banner};

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const TRY_ANOTHER: &str = "Try another image";
const EXIT: &str = "Exit";

/// What the user picked from the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Ask(Intent),
    TryAnother,
    Exit,
}

/// Menu rows for the current state. Questions are only offered once a
/// landmark has been accepted.
fn menu(state: &SessionState) -> Vec<(String, MenuChoice)> {
    let mut items = Vec::new();
    if state.accepts_questions() {
        for intent in Intent::ALL {
            items.push((
                format!("{:<22} {}", intent.title(), intent.help()),
                MenuChoice::Ask(intent),
            ));
        }
    }
    items.push((TRY_ANOTHER.to_string(), MenuChoice::TryAnother));
    items.push((EXIT.to_string(), MenuChoice::Exit));
    items
}

/// Map a menu result to a choice. Esc and Ctrl+C both leave the menu.
fn choose(items: &[(String, MenuChoice)], selection: Option<Option<usize>>) -> MenuChoice {
    selection
        .flatten()
        .and_then(|i| items.get(i))
        .map_or(MenuChoice::Exit, |(_, choice)| *choice)
}

/// Run the menu loop until the user exits.
pub async fn run(explorer: &Explorer, mut session: Session, format: OutputFormat) -> anyhow::Result<()> {
    print_banner();
    let theme = landmark_theme();

    loop {
        let items = menu(session.state());
        let labels: Vec<&str> = items.iter().map(|(label, _)| label.as_str()).collect();
        let prompt = match session.state().landmark() {
            Some(landmark) => format!("What would you like to know about {}?", landmark.label),
            None => "What would you like to do?".to_string(),
        };

        let selection = handle_interrupt(
            Select::with_theme(&theme)
                .with_prompt(prompt)
                .items(&labels)
                .default(0)
                .interact_opt(),
        )?;

        match choose(&items, selection) {
            MenuChoice::Ask(intent) => {
                let state = super::ask(&mut session, intent, format).await;
                offer_retry(&mut session, state, format).await?;
            }
            MenuChoice::TryAnother => {
                session.reset();
                if !next_image(explorer, &mut session, format).await? {
                    break;
                }
            }
            MenuChoice::Exit => break,
        }
    }

    Ok(())
}

/// While generation keeps failing, ask whether to re-issue the same request.
/// Returns the state the user stopped at.
pub(super) async fn offer_retry(
    session: &mut Session,
    mut state: SessionState,
    format: OutputFormat,
) -> anyhow::Result<SessionState> {
    let theme = landmark_theme();
    while matches!(state, SessionState::GenerationFailed { .. }) {
        let again = handle_interrupt(
            Confirm::with_theme(&theme)
                .with_prompt("Retry?")
                .default(true)
                .interact(),
        )?;
        if again != Some(true) {
            break;
        }
        state = super::retry(session, format).await;
    }
    Ok(state)
}

/// Prompt for another image path and identify it. Returns `false` if the
/// user backed out.
async fn next_image(
    explorer: &Explorer,
    session: &mut Session,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let theme = landmark_theme();
    let Some(raw) = handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Image path")
            .interact_text(),
    )?
    else {
        return Ok(false);
    };

    let path = shellexpand::tilde(raw.trim()).into_owned();
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            super::render::error_line(&format!("Failed to read {path}: {e}"));
            return Ok(true);
        }
    };

    if let Some(jpeg) = super::prepare(explorer, bytes).await {
        super::identify(session, &jpeg, format).await;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use landmark_core::{Landmark, RejectionReason};

    #[test]
    fn test_menu_after_acceptance_lists_all_intents() {
        let state = SessionState::Accepted(Landmark {
            label: "Eiffel Tower".to_string(),
            confidence: 0.9,
        });
        let items = menu(&state);
        assert_eq!(items.len(), Intent::ALL.len() + 2);
        assert_eq!(items[0].1, MenuChoice::Ask(Intent::Description));
        assert_eq!(items[3].1, MenuChoice::Ask(Intent::NearbyAttractions));
        assert_eq!(items.last().map(|i| i.1), Some(MenuChoice::Exit));
    }

    #[test]
    fn test_menu_after_rejection_offers_no_questions() {
        let state = SessionState::Rejected {
            reason: RejectionReason::LowConfidence,
            top: None,
        };
        let items = menu(&state);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].1, MenuChoice::TryAnother);
        assert!(items
            .iter()
            .all(|(_, choice)| !matches!(choice, MenuChoice::Ask(_))));
    }

    #[test]
    fn test_handle_interrupt_maps_ctrl_c_to_none() {
        let err = dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "ctrl-c",
        ));
        let result: anyhow::Result<Option<bool>> = handle_interrupt(Err(err));
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_menu_interrupt_and_escape_exit() {
        let items = menu(&SessionState::Accepted(Landmark {
            label: "Colosseum".to_string(),
            confidence: 0.8,
        }));

        let interrupted = dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "ctrl-c",
        ));
        let selection = handle_interrupt::<Option<usize>>(Err(interrupted)).unwrap();
        assert_eq!(choose(&items, selection), MenuChoice::Exit);

        assert_eq!(choose(&items, Some(None)), MenuChoice::Exit);
        assert_eq!(
            choose(&items, Some(Some(1))),
            MenuChoice::Ask(Intent::History)
        );
        assert_eq!(choose(&items, Some(Some(99))), MenuChoice::Exit);
    }
}
