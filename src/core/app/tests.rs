use super::*;
use crate::core::chat_stream::RequestJob;
use crate::core::message::{ImagePart, Role};
use crate::core::vendor::VendorErrorKind;
use crate::utils::test_utils::{create_logged_in_app, create_test_app};
use tokio_util::sync::CancellationToken;

fn act(app: &mut App, action: AppAction) -> Option<AppCommand> {
    apply_action(app, action, AppActionContext::default())
}

/// Types `text` and presses send, returning the spawned request.
fn send(app: &mut App, text: &str) -> Option<(u64, RequestJob, bool)> {
    app.ui.set_input_text(text);
    match act(app, AppAction::SendMessage)? {
        AppCommand::SpawnRequest {
            job,
            request_id,
            ramp,
            ..
        } => Some((request_id, job, ramp)),
        other => panic!("unexpected command {other:?}"),
    }
}

fn deliver_text(app: &mut App, request_id: u64, text: &str) {
    act(
        app,
        AppAction::DeliverResponse {
            request_id,
            delivery: Delivery::Text(text.to_string()),
        },
    );
}

fn active_messages(app: &App) -> Vec<(Role, String)> {
    app.active_session()
        .expect("active session")
        .messages
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect()
}

fn attach_test_ticker(app: &mut App, request_id: u64) -> CancellationToken {
    let token = CancellationToken::new();
    app.attach_ticker(request_id, token.clone().drop_guard());
    token
}

#[test]
fn login_creates_first_chat_and_switches_screen() {
    let mut app = create_test_app();
    act(&mut app, AppAction::Login { name: "   ".into() });
    assert!(app.user.is_none());
    assert_eq!(app.ui.screen, Screen::Login);

    act(&mut app, AppAction::Login { name: "Ada Lovelace".into() });
    let user = app.user.as_ref().expect("user");
    assert_eq!(user.email, "ada.lovelace@lumiera.ai");
    assert_eq!(app.ui.screen, Screen::Chat);
    assert_eq!(app.sessions.len(), 1);
    assert_eq!(app.active_session().expect("active").title, "New chat");
}

#[test]
fn successful_turns_alternate_user_and_assistant() {
    let mut app = create_logged_in_app();
    for turn in 0..3 {
        let (request_id, _, _) = send(&mut app, &format!("question {turn}")).expect("sent");
        deliver_text(&mut app, request_id, &format!("answer {turn}"));
        assert!(!app.is_sending());
    }

    let messages = active_messages(&app);
    assert_eq!(messages.len(), 6);
    for (index, (role, content)) in messages.iter().enumerate() {
        if index % 2 == 0 {
            assert_eq!(*role, Role::User);
            assert_eq!(content, &format!("question {}", index / 2));
        } else {
            assert_eq!(*role, Role::Assistant);
            assert_eq!(content, &format!("answer {}", index / 2));
        }
    }
}

#[test]
fn chat_request_carries_history_without_placeholder() {
    let mut app = create_logged_in_app();
    let (first, _, _) = send(&mut app, "Hi").expect("sent");
    deliver_text(&mut app, first, "Hello!");

    let (_, job, ramp) = send(&mut app, "Tell me a joke").expect("sent");
    assert!(!ramp);
    match job {
        RequestJob::Chat { history, model } => {
            assert_eq!(model, "gemini-3-pro-preview");
            let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
            assert_eq!(contents, vec!["Hi", "Hello!", "Tell me a joke"]);
        }
        other => panic!("expected chat job, got {other:?}"),
    }
    // User message plus an empty placeholder while pending.
    let messages = active_messages(&app);
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3], (Role::Assistant, String::new()));
}

#[test]
fn send_clears_input_and_banner() {
    let mut app = create_logged_in_app();
    app.error = Some("old".into());
    send(&mut app, "  padded question \n").expect("sent");
    assert!(app.error.is_none());
    assert_eq!(app.ui.input_text(), "");
    assert_eq!(active_messages(&app)[0].1, "  padded question \n");
}

#[test]
fn failed_turn_keeps_user_message_and_sets_generic_banner() {
    let mut app = create_logged_in_app();
    let (first, _, _) = send(&mut app, "one").expect("sent");
    deliver_text(&mut app, first, "reply");
    let before = active_messages(&app).len();

    let (request_id, _, _) = send(&mut app, "two").expect("sent");
    act(
        &mut app,
        AppAction::FailMessage {
            request_id,
            kind: VendorErrorKind::Transient,
        },
    );

    let messages = active_messages(&app);
    assert_eq!(messages.len(), before + 1);
    assert_eq!(messages.last().expect("last").1, "two");
    assert_eq!(app.error.as_deref(), Some(GENERIC_ERROR_BANNER));
    assert!(!app.is_sending());
}

#[test]
fn auth_failures_use_configuration_banner() {
    let mut app = create_logged_in_app();
    let (request_id, _, _) = send(&mut app, "hello").expect("sent");
    act(
        &mut app,
        AppAction::FailMessage {
            request_id,
            kind: VendorErrorKind::AuthConfiguration,
        },
    );
    assert_eq!(app.error.as_deref(), Some(AUTH_ERROR_BANNER));
}

#[test]
fn empty_reply_is_treated_as_failure() {
    let mut app = create_logged_in_app();
    let (request_id, _, _) = send(&mut app, "hello").expect("sent");
    deliver_text(&mut app, request_id, "  ");
    assert_eq!(active_messages(&app).len(), 1);
    assert_eq!(app.error.as_deref(), Some(GENERIC_ERROR_BANNER));
}

#[test]
fn title_comes_from_first_message_and_never_changes() {
    let mut app = create_logged_in_app();
    let long = "This first message is definitely longer than thirty characters";
    let (request_id, _, _) = send(&mut app, long).expect("sent");
    deliver_text(&mut app, request_id, "ok");
    send(&mut app, "second message").expect("sent");

    let title = &app.active_session().expect("active").title;
    assert_eq!(title, "This first message is definite...");
}

#[test]
fn title_keeps_leading_whitespace_as_typed() {
    let mut app = create_logged_in_app();
    send(&mut app, "  indented code").expect("sent");
    assert_eq!(app.active_session().expect("active").title, "  indented code");
}

#[test]
fn submit_is_a_no_op_while_in_flight() {
    let mut app = create_logged_in_app();
    send(&mut app, "first").expect("sent");
    let before = active_messages(&app);

    assert!(send(&mut app, "second").is_none());
    assert_eq!(active_messages(&app), before);
    assert_eq!(app.ui.input_text(), "second");
}

#[test]
fn submit_requires_text_and_an_active_session() {
    let mut app = create_logged_in_app();
    assert!(send(&mut app, "   \n ").is_none());
    assert!(active_messages(&app).is_empty());

    let id = app.active_session().expect("active").id.clone();
    act(&mut app, AppAction::DeleteSession { session_id: id });
    assert!(send(&mut app, "hello").is_none());
    assert!(app.error.is_none());
}

#[test]
fn fragments_fill_preview_and_placeholder_changes_once() {
    let mut app = create_logged_in_app();
    let (request_id, _, _) = send(&mut app, "stream please").expect("sent");
    for text in ["Hel", "lo"] {
        act(
            &mut app,
            AppAction::ResponseFragment {
                request_id,
                text: text.into(),
            },
        );
    }
    let session_id = app.active_session().expect("active").id.clone();
    let (_, preview) = app.preview_for(&session_id).expect("preview");
    assert_eq!(preview, "Hello");
    assert_eq!(active_messages(&app)[1].1, "");

    deliver_text(&mut app, request_id, "Hello");
    assert_eq!(active_messages(&app)[1].1, "Hello");
    assert!(app.preview_for(&session_id).is_none());
}

#[test]
fn stale_request_events_are_ignored() {
    let mut app = create_logged_in_app();
    let (request_id, _, _) = send(&mut app, "hi").expect("sent");
    deliver_text(&mut app, request_id + 100, "wrong");
    act(
        &mut app,
        AppAction::FailMessage {
            request_id: request_id + 100,
            kind: VendorErrorKind::Transient,
        },
    );
    assert!(app.is_sending());
    assert!(app.error.is_none());
}

#[test]
fn delivery_targets_the_originating_session() {
    let mut app = create_logged_in_app();
    let origin = app.active_session().expect("active").id.clone();
    let (request_id, _, _) = send(&mut app, "question").expect("sent");

    act(&mut app, AppAction::NewChat);
    let other = app.active_session().expect("active").id.clone();
    assert_ne!(origin, other);

    deliver_text(&mut app, request_id, "answer");
    let origin_session = app.sessions.get(&origin).expect("origin");
    assert_eq!(origin_session.messages.len(), 2);
    assert_eq!(origin_session.messages[1].content, "answer");
    assert!(app.sessions.get(&other).expect("other").is_empty());
}

#[test]
fn deleting_the_pending_session_cancels_the_request() {
    let mut app = create_logged_in_app();
    let origin = app.active_session().expect("active").id.clone();
    let (request_id, _, _) = send(&mut app, "x ".repeat(120).trim()).expect("sent");
    let ticker = attach_test_ticker(&mut app, request_id);

    act(
        &mut app,
        AppAction::DeleteSession {
            session_id: origin.clone(),
        },
    );
    assert!(!app.is_sending());
    assert!(ticker.is_cancelled());

    deliver_text(&mut app, request_id, "late");
    assert!(app.sessions.get(&origin).is_none());
    assert!(app.sessions.iter().all(|session| session.messages.is_empty()));
}

#[test]
fn deleting_the_last_chat_opens_a_fresh_one() {
    let mut app = create_logged_in_app();
    let only = app.active_session().expect("active").id.clone();

    act(
        &mut app,
        AppAction::DeleteSession {
            session_id: only.clone(),
        },
    );
    assert_eq!(app.sessions.len(), 1);
    let fresh = app.active_session().expect("fresh chat is active");
    assert_ne!(fresh.id, only);
    assert_eq!(fresh.title, "New chat");

    assert!(send(&mut app, "hello").is_some());
}

#[test]
fn deleting_one_of_several_chats_keeps_the_rest() {
    let mut app = create_logged_in_app();
    act(&mut app, AppAction::NewChat);
    let active = app.active_session().expect("active").id.clone();

    act(&mut app, AppAction::DeleteSession { session_id: active });
    assert_eq!(app.sessions.len(), 1);
    assert!(app.active_session().is_none());
}

#[test]
fn image_mode_switches_model_and_resets_on_new_chat() {
    let mut app = create_logged_in_app();
    act(&mut app, AppAction::ToggleImageMode);
    assert!(app.image_mode);
    assert_eq!(app.selected_model, ModelKind::Image);

    act(&mut app, AppAction::ToggleImageMode);
    assert!(!app.image_mode);
    assert_eq!(app.selected_model, ModelKind::Pro);

    act(&mut app, AppAction::ToggleImageMode);
    act(&mut app, AppAction::NewChat);
    assert!(!app.image_mode);
    assert_eq!(app.selected_model, ModelKind::Pro);
}

#[test]
fn image_mode_cannot_toggle_while_pending_and_blocks_model_picker() {
    let mut app = create_logged_in_app();
    act(&mut app, AppAction::ToggleImageMode);
    act(&mut app, AppAction::SelectModel { kind: ModelKind::Flash });
    assert_eq!(app.selected_model, ModelKind::Image);
    act(&mut app, AppAction::OpenModelPicker);
    assert!(app.ui.overlay.is_none());

    send(&mut app, "a red fox").expect("sent");
    act(&mut app, AppAction::ToggleImageMode);
    assert!(app.image_mode);
}

#[test]
fn image_requests_use_placeholder_and_deliver_parts() {
    let mut app = create_logged_in_app();
    act(&mut app, AppAction::ToggleImageMode);
    let (request_id, job, _) = send(&mut app, "a lighthouse at dusk").expect("sent");
    assert!(matches!(job, RequestJob::Image { ref prompt } if prompt == "a lighthouse at dusk"));
    assert_eq!(active_messages(&app)[1].1, IMAGE_PLACEHOLDER);

    let parts = vec![ImagePart::new("iVBORw0KGgo=", "image/png")];
    act(
        &mut app,
        AppAction::DeliverResponse {
            request_id,
            delivery: Delivery::Images(Some(parts.clone())),
        },
    );
    let reply = &app.active_session().expect("active").messages[1];
    assert_eq!(reply.content, IMAGE_GENERATED);
    assert_eq!(reply.images.as_ref(), Some(&parts));

    let (second, _, _) = send(&mut app, "nothing").expect("sent");
    act(
        &mut app,
        AppAction::DeliverResponse {
            request_id: second,
            delivery: Delivery::Images(None),
        },
    );
    assert_eq!(active_messages(&app)[3].1, IMAGE_FAILED);
}

#[test]
fn model_picker_selects_text_models() {
    let mut app = create_logged_in_app();
    act(&mut app, AppAction::OpenModelPicker);
    assert_eq!(app.ui.overlay, Some(Overlay::ModelPicker { selected: 0 }));
    act(&mut app, AppAction::PickerMove { delta: 5 });
    assert_eq!(app.ui.overlay, Some(Overlay::ModelPicker { selected: 2 }));
    act(&mut app, AppAction::PickerMove { delta: -1 });
    act(&mut app, AppAction::PickerConfirm);
    assert_eq!(app.selected_model, ModelKind::Flash);
    assert!(app.ui.overlay.is_none());

    let (_, job, _) = send(&mut app, "quick one").expect("sent");
    assert!(matches!(job, RequestJob::Chat { ref model, .. } if model == "gemini-flash-latest"));
}

#[test]
fn enhance_is_a_no_op_on_blank_input() {
    let mut app = create_logged_in_app();
    app.ui.set_input_text("   ");
    assert!(act(&mut app, AppAction::EnhancePrompt).is_none());
    assert!(!app.is_enhancing());
}

#[test]
fn enhance_is_gated_on_pending_work_and_image_mode() {
    let mut app = create_logged_in_app();
    act(&mut app, AppAction::ToggleImageMode);
    app.ui.set_input_text("draw");
    assert!(act(&mut app, AppAction::EnhancePrompt).is_none());
    act(&mut app, AppAction::ToggleImageMode);

    app.ui.set_input_text("rewrite me");
    assert!(act(&mut app, AppAction::EnhancePrompt).is_some());
    assert!(act(&mut app, AppAction::EnhancePrompt).is_none());
}

#[test]
fn enhance_replaces_input_or_reports_failure() {
    let mut app = create_logged_in_app();
    app.ui.set_input_text("rewrite me");
    let Some(AppCommand::SpawnRequest {
        job, request_id, ..
    }) = act(&mut app, AppAction::EnhancePrompt)
    else {
        panic!("expected enhance request");
    };
    assert!(matches!(job, RequestJob::Enhance { ref prompt } if prompt == "rewrite me"));

    act(
        &mut app,
        AppAction::EnhanceCompleted {
            request_id,
            text: "Rewrite this text clearly.".into(),
        },
    );
    assert_eq!(app.ui.input_text(), "Rewrite this text clearly.");
    assert!(!app.is_enhancing());

    let Some(AppCommand::SpawnRequest { request_id, .. }) =
        act(&mut app, AppAction::EnhancePrompt)
    else {
        panic!("expected enhance request");
    };
    act(&mut app, AppAction::EnhanceFailed { request_id });
    assert_eq!(app.error.as_deref(), Some(ENHANCE_ERROR_BANNER));
    assert_eq!(app.ui.input_text(), "Rewrite this text clearly.");
}

#[test]
fn cancel_request_removes_placeholder_without_banner() {
    let mut app = create_logged_in_app();
    let (request_id, _, _) = send(&mut app, "never mind").expect("sent");
    let ticker = attach_test_ticker(&mut app, request_id);

    act(&mut app, AppAction::CancelRequest);
    assert!(!app.is_sending());
    assert!(ticker.is_cancelled());
    assert!(app.error.is_none());
    assert_eq!(
        active_messages(&app),
        vec![(Role::User, "never mind".to_string())]
    );
}

#[test]
fn load_ticker_is_released_on_every_exit_path() {
    let long_prompt = "word ".repeat(150);

    let mut app = create_logged_in_app();
    let (request_id, _, ramp) = send(&mut app, &long_prompt).expect("sent");
    assert!(ramp);
    let ticker = attach_test_ticker(&mut app, request_id);
    deliver_text(&mut app, request_id, "done");
    assert!(ticker.is_cancelled());

    let (request_id, _, _) = send(&mut app, &long_prompt).expect("sent");
    let ticker = attach_test_ticker(&mut app, request_id);
    act(
        &mut app,
        AppAction::FailMessage {
            request_id,
            kind: VendorErrorKind::Transient,
        },
    );
    assert!(ticker.is_cancelled());

    let (request_id, _, _) = send(&mut app, &long_prompt).expect("sent");
    let ticker = attach_test_ticker(&mut app, request_id);
    act(&mut app, AppAction::Logout);
    assert!(ticker.is_cancelled());
}

#[test]
fn load_ticks_ramp_the_indicator_until_full() {
    let mut app = create_logged_in_app();
    let (request_id, _, _) = send(&mut app, &"word ".repeat(100)).expect("sent");
    attach_test_ticker(&mut app, request_id);
    assert_eq!(app.load.text(), "5/17 GPU");

    for _ in 0..12 {
        act(&mut app, AppAction::LoadTick { request_id });
    }
    assert_eq!(app.load.text(), "17/17 GPU");
    assert!(!app.pending().expect("pending").has_ticker());

    deliver_text(&mut app, request_id, "ok");
    assert_eq!(app.load.text(), "0/17 GPU");
}

#[test]
fn logout_discards_user_and_sessions() {
    let mut app = create_logged_in_app();
    act(&mut app, AppAction::NewChat);
    send(&mut app, "pending").expect("sent");
    app.error = Some("boom".into());

    act(&mut app, AppAction::Logout);
    assert!(app.user.is_none());
    assert!(app.sessions.is_empty());
    assert!(app.active_session().is_none());
    assert!(!app.is_sending());
    assert!(app.error.is_none());
    assert_eq!(app.ui.screen, Screen::Login);
}

#[test]
fn profile_update_renames_but_keeps_email() {
    let mut app = create_logged_in_app();
    act(&mut app, AppAction::OpenProfile);
    assert_eq!(app.ui.overlay, Some(Overlay::Profile));

    act(&mut app, AppAction::UpdateProfile { name: "  ".into() });
    assert_eq!(app.ui.overlay, Some(Overlay::Profile));

    act(&mut app, AppAction::UpdateProfile { name: "Grace Hopper".into() });
    let user = app.user.as_ref().expect("user");
    assert_eq!(user.name, "Grace Hopper");
    assert_eq!(user.email, "ada.lovelace@lumiera.ai");
    assert!(app.ui.overlay.is_none());
}

#[test]
fn new_chats_go_to_the_front_and_switching_follows_order() {
    let mut app = create_logged_in_app();
    let first = app.active_session().expect("active").id.clone();
    act(&mut app, AppAction::NewChat);
    let second = app.active_session().expect("active").id.clone();
    assert_eq!(app.sessions.as_slice()[0].id, second);

    act(&mut app, AppAction::SelectSession { session_id: first.clone() });
    assert_eq!(app.sessions.active_id(), Some(first.as_str()));
    act(&mut app, AppAction::SelectSession { session_id: "missing".into() });
    assert_eq!(app.sessions.active_id(), Some(first.as_str()));
}

#[test]
fn suggestions_fill_the_composer() {
    let mut app = create_logged_in_app();
    act(&mut app, AppAction::UseSuggestion { index: 2 });
    assert_eq!(app.ui.input_text(), SUGGESTIONS[2]);
    act(&mut app, AppAction::UseSuggestion { index: 9 });
    assert_eq!(app.ui.input_text(), SUGGESTIONS[2]);
}

#[test]
fn save_images_targets_latest_generated_images() {
    let mut app = create_logged_in_app();
    assert!(act(&mut app, AppAction::SaveImages).is_none());
    assert!(app.ui.status.is_some());

    act(&mut app, AppAction::ToggleImageMode);
    let (request_id, _, _) = send(&mut app, "a cat").expect("sent");
    let parts = vec![ImagePart::new("AAAA", "image/jpeg")];
    act(
        &mut app,
        AppAction::DeliverResponse {
            request_id,
            delivery: Delivery::Images(Some(parts.clone())),
        },
    );

    match act(&mut app, AppAction::SaveImages) {
        Some(AppCommand::SaveImages { session_id, images }) => {
            assert_eq!(Some(session_id.as_str()), app.sessions.active_id());
            assert_eq!(images, parts);
        }
        other => panic!("expected save command, got {other:?}"),
    }
}

#[test]
fn request_events_map_to_actions() {
    use crate::core::chat_stream::RequestEvent;
    use crate::core::vendor::VendorError;

    let action = AppAction::from_request_event(
        RequestEvent::Failed(VendorError::MissingApiKey { var: "K".into() }),
        4,
    );
    assert!(matches!(
        action,
        AppAction::FailMessage {
            request_id: 4,
            kind: VendorErrorKind::AuthConfiguration
        }
    ));
    let action = AppAction::from_request_event(
        RequestEvent::EnhanceFailed(VendorError::InvalidHistory("empty".into())),
        5,
    );
    assert!(matches!(action, AppAction::EnhanceFailed { request_id: 5 }));
}
