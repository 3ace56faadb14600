use dot_estimate_core::PromotionChoice;
use dot_estimate_rendering::{DialogAction, FrameInput, SettingAdjustment};
use dot_estimate_rendering_macroquad::ControlPanelInputState;

fn run_toggle_sequence(sequence: &[bool]) -> Vec<bool> {
    let mut state = ControlPanelInputState::default();
    let mut toggles = Vec::new();
    for &pressed in sequence {
        toggles.push(state.take_frame_input().toggle_pause);
        if pressed {
            state.register_toggle_pause();
        }
    }

    // Flush any trailing latched press so the harness observes the final toggle.
    toggles.push(state.take_frame_input().toggle_pause);
    toggles
}

fn run_guess_sequence(sequence: &[Option<u32>]) -> Vec<Option<u32>> {
    let mut state = ControlPanelInputState::default();
    let mut guesses = Vec::new();
    for &pressed in sequence {
        guesses.push(state.take_frame_input().guess);
        if let Some(value) = pressed {
            state.register_guess(value);
        }
    }
    guesses.push(state.take_frame_input().guess);
    guesses
}

#[test]
fn control_panel_button_toggle_sequence_is_deterministic() {
    let button_sequence = [false, true, false, true, true, false];
    let expected = vec![false, false, true, false, true, true, false];

    let first_run = run_toggle_sequence(&button_sequence);
    let second_run = run_toggle_sequence(&button_sequence);

    assert_eq!(first_run, expected);
    assert_eq!(first_run, second_run);
}

#[test]
fn guess_button_sequence_is_deterministic() {
    let button_sequence = [Some(3), None, Some(5), Some(6), None];
    let expected = vec![None, Some(3), None, Some(5), Some(6), None];

    let first_run = run_guess_sequence(&button_sequence);
    let second_run = run_guess_sequence(&button_sequence);

    assert_eq!(first_run, expected);
    assert_eq!(first_run, second_run);
}

#[test]
fn a_frame_carries_every_latched_press_once() {
    let mut state = ControlPanelInputState::default();
    state.register_restart();
    state.register_dismiss();
    state.register_adjustment(SettingAdjustment::FasterDrift);
    state.register_dialog_action(DialogAction::Promotion(PromotionChoice::LessTime));

    let input = state.take_frame_input();

    assert_eq!(
        input,
        FrameInput {
            restart: true,
            dismiss_dialog: true,
            adjustment: Some(SettingAdjustment::FasterDrift),
            promotion: Some(PromotionChoice::LessTime),
            ..FrameInput::default()
        }
    );
    assert!(state.take_frame_input().is_idle());
}
