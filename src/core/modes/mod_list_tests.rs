use super::*;
use crate::core::host::memory::MemoryHost;
use crate::core::host::{Capability, ModDetails};
use crate::core::speech::{Priority, SpeechChannel};
use ratatui::crossterm::event::KeyModifiers;

const HARMONY: &str = "2009463077";
const HUGSLIB: &str = "818773962";

fn host_selecting(key: &str) -> MemoryHost {
    let mut host = MemoryHost::sample();
    host.mods.primary = Some(key.to_string());
    host
}

fn open(host: &mut MemoryHost, speech: &mut SpeechChannel) -> ModListBrowser {
    let mut browser = ModListBrowser::new();
    assert!(browser.open(&mut ModeContext::new(host, speech)));
    browser
}

#[test]
fn open_starts_at_host_selection() {
    let mut host = host_selecting(HUGSLIB);
    let mut speech = SpeechChannel::silent();
    let browser = open(&mut host, &mut speech);

    assert_eq!(browser.column(), ModColumn::Active);
    assert_eq!(browser.index(), 3);
    assert_eq!(
        speech.last_text(),
        Some("Mod list. HugsLib, 4 of 4, enabled")
    );
}

#[test]
fn open_finds_selection_in_inactive_column() {
    let mut host = host_selecting("MyTestMod");
    let mut speech = SpeechChannel::silent();
    let browser = open(&mut host, &mut speech);

    assert_eq!(browser.column(), ModColumn::Inactive);
    assert_eq!(browser.index(), 1);
    assert_eq!(
        speech.last_text(),
        Some("Mod list. My Test Mod, 2 of 3, disabled, has errors")
    );
}

#[test]
fn entry_line_flags_incompatible_versions() {
    let mut host = host_selecting("836308268");
    let mut speech = SpeechChannel::silent();
    open(&mut host, &mut speech);
    assert_eq!(
        speech.last_text(),
        Some("Mod list. Dubs Bad Hygiene, 1 of 3, disabled, version incompatible")
    );
}

#[test]
fn unavailable_registry_does_not_open() {
    let mut host = MemoryHost::sample();
    host.disable(Capability::ModRegistry);
    let mut speech = SpeechChannel::silent();
    let mut browser = ModListBrowser::new();

    assert!(!browser.open(&mut ModeContext::new(&mut host, &mut speech)));
    assert!(!browser.is_active());
    assert_eq!(speech.last_text(), Some("Mod list is unavailable"));
}

#[test]
fn navigation_wraps_and_moves_host_selection() {
    let mut host = MemoryHost::sample();
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    let mut ctx = ModeContext::new(&mut host, &mut speech);

    browser.select_previous(&mut ctx);
    assert_eq!(browser.index(), 3);
    browser.select_next(&mut ctx);
    assert_eq!(browser.index(), 0);
    browser.select_last(&mut ctx);
    browser.select_first(&mut ctx);
    browser.select_next(&mut ctx);
    assert_eq!(ctx.speech.last_text(), Some("Royalty, 2 of 4, enabled"));
    assert_eq!(host.mods.primary.as_deref(), Some("Royalty"));
}

#[test]
fn navigation_follows_live_filter() {
    let mut host = host_selecting(HUGSLIB);
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    host.mods.filter = Some("ro".to_string());
    browser.select_next(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(browser.index(), 0);
    assert_eq!(speech.last_text(), Some("Royalty, 1 of 1, enabled"));
}

#[test]
fn switching_columns_twice_returns_to_same_entry() {
    let mut host = MemoryHost::sample();
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    let mut ctx = ModeContext::new(&mut host, &mut speech);
    browser.select_next(&mut ctx);
    browser.select_next(&mut ctx);

    browser.switch_column(&mut ctx);
    assert_eq!(browser.column(), ModColumn::Inactive);
    assert_eq!(browser.index(), 0);
    assert_eq!(
        ctx.speech.last_text(),
        Some("Inactive mods. Dubs Bad Hygiene, 1 of 3, disabled, version incompatible")
    );
    browser.select_next(&mut ctx);

    browser.switch_column(&mut ctx);
    assert_eq!((browser.column(), browser.index()), (ModColumn::Active, 2));
    browser.switch_column(&mut ctx);
    assert_eq!((browser.column(), browser.index()), (ModColumn::Inactive, 1));
    assert_eq!(host.mods.primary.as_deref(), Some("MyTestMod"));
}

#[test]
fn switching_to_empty_column_says_so() {
    let mut host = MemoryHost::sample();
    host.mods.filter = Some("royal".to_string());
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    assert_eq!(speech.last_text(), Some("Mod list. Royalty, 1 of 1, enabled"));

    browser.switch_column(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(browser.column(), ModColumn::Inactive);
    assert_eq!(speech.last_text(), Some("Inactive mods list is empty"));
}

#[test]
fn toggling_follows_entry_to_other_column() {
    let mut host = host_selecting(HUGSLIB);
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.toggle_selected(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!((browser.column(), browser.index()), (ModColumn::Inactive, 0));
    assert_eq!(
        speech.last_text(),
        Some("HugsLib disabled. HugsLib, 1 of 4, disabled")
    );
    assert!(!host.mods.entry(HUGSLIB).unwrap().active);
    assert!(!host.mods.order.contains(&HUGSLIB.to_string()));
}

#[test]
fn toggling_twice_restores_activation() {
    let mut host = host_selecting("MyTestMod");
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    let mut ctx = ModeContext::new(&mut host, &mut speech);

    browser.toggle_selected(&mut ctx);
    assert_eq!(browser.column(), ModColumn::Active);
    browser.toggle_selected(&mut ctx);
    assert_eq!(browser.column(), ModColumn::Inactive);
    assert!(!host.mods.entry("MyTestMod").unwrap().active);
}

#[test]
fn duplicate_package_id_is_refused_urgently() {
    let mut host = host_selecting("HarmonyLocal");
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.toggle_selected(&mut ModeContext::new(&mut host, &mut speech));

    let last = speech.last().unwrap();
    assert_eq!(last.priority, Priority::High);
    assert_eq!(
        last.text,
        "Cannot enable Harmony (local copy): package id brrainz.harmony is already used by Harmony"
    );
    assert_eq!((browser.column(), browser.index()), (ModColumn::Inactive, 2));
    assert!(!host.mods.entry("HarmonyLocal").unwrap().active);
}

#[test]
fn reorder_uses_load_order_position_under_filter() {
    let mut host = host_selecting(HUGSLIB);
    host.mods.filter = Some("hugs".to_string());
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    assert_eq!(browser.index(), 0);

    browser.move_up(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(host.mods.calls, vec!["reorder 3 2".to_string()]);
    assert_eq!(host.mods.order, vec!["Core", "Royalty", HUGSLIB, HARMONY]);
    assert_eq!(
        speech.last_text(),
        Some("HugsLib moved to position 3 of 4 in load order")
    );
}

#[test]
fn reorder_stops_at_both_ends() {
    let mut host = MemoryHost::sample();
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    let mut ctx = ModeContext::new(&mut host, &mut speech);

    browser.move_up(&mut ctx);
    assert_eq!(ctx.speech.last_text(), Some("Core is already at the top"));
    browser.select_last(&mut ctx);
    browser.move_down(&mut ctx);
    assert_eq!(
        ctx.speech.last_text(),
        Some("HugsLib is already at the bottom")
    );
    assert!(host.mods.calls.is_empty());
}

#[test]
fn reorder_down_then_up_restores_order() {
    let mut host = host_selecting("Royalty");
    let mut speech = SpeechChannel::silent();
    let before = host.mods.order.clone();
    let mut browser = open(&mut host, &mut speech);
    let mut ctx = ModeContext::new(&mut host, &mut speech);

    browser.move_down(&mut ctx);
    assert_eq!(browser.index(), 2);
    browser.move_up(&mut ctx);
    assert_eq!(browser.index(), 1);
    assert_eq!(host.mods.order, before);
}

#[test]
fn inactive_mods_cannot_be_reordered() {
    let mut host = host_selecting("MyTestMod");
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.move_up(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(
        speech.last_text(),
        Some("Only active mods can be reordered")
    );
    assert!(host.mods.calls.is_empty());
}

#[test]
fn rejected_reorder_is_urgent() {
    let mut host = host_selecting("Royalty");
    host.mods.reject_reorder = Some("Core must load first".to_string());
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.move_up(&mut ModeContext::new(&mut host, &mut speech));

    let last = speech.last().unwrap();
    assert_eq!(last.priority, Priority::High);
    assert_eq!(last.text, "Cannot move Royalty: Core must load first");
}

#[test]
fn auto_sort_refocuses_first_entry() {
    let mut host = host_selecting(HUGSLIB);
    host.mods.order.reverse();
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    assert_eq!(browser.index(), 0);
    browser.select_next(&mut ModeContext::new(&mut host, &mut speech));

    browser.auto_sort(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(browser.index(), 0);
    assert_eq!(speech.last_text(), Some("Mods sorted. Core, 1 of 4, enabled"));
}

#[test]
fn info_joins_available_details() {
    let mut host = host_selecting(HUGSLIB);
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.read_info(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(
        speech.last_text(),
        Some("HugsLib. by UnlimitedHugs. version 11.0.5. A library for RimWorld modders.")
    );
}

#[test]
fn info_mentions_incompatibility_and_cuts_long_descriptions() {
    let mut host = host_selecting("836308268");
    host.mods.details.insert(
        "836308268".to_string(),
        ModDetails {
            description: Some("x".repeat(DESCRIPTION_LIMIT + 100)),
            ..ModDetails::default()
        },
    );
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.read_info(&mut ModeContext::new(&mut host, &mut speech));

    let text = speech.last_text().unwrap();
    assert!(text.starts_with("Dubs Bad Hygiene. Not made for this game version. xxx"));
    assert!(text.ends_with("..."));
    let expected_len = "Dubs Bad Hygiene. Not made for this game version. ".len()
        + DESCRIPTION_LIMIT
        + crate::core::announce::ELLIPSIS.len();
    assert_eq!(text.len(), expected_len);
}

#[test]
fn settings_open_only_when_present() {
    let mut host = MemoryHost::sample();
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    let mut ctx = ModeContext::new(&mut host, &mut speech);

    browser.open_settings(&mut ctx);
    assert_eq!(ctx.speech.last_text(), Some("Core has no settings"));
    browser.select_last(&mut ctx);
    browser.open_settings(&mut ctx);
    assert_eq!(ctx.speech.last_text(), Some("Opened settings for HugsLib"));
    assert_eq!(host.mods.calls, vec![format!("open_settings {HUGSLIB}")]);
}

#[test]
fn folder_opens_for_any_mod() {
    let mut host = MemoryHost::sample();
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.open_mod_folder(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(speech.last_text(), Some("Opened folder of Core"));
    assert_eq!(host.mods.calls, vec!["open_folder Core".to_string()]);
}

#[test]
fn workshop_page_requires_workshop_source() {
    let mut host = MemoryHost::sample();
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    let mut ctx = ModeContext::new(&mut host, &mut speech);

    browser.open_workshop_page(&mut ctx);
    assert_eq!(ctx.speech.last_text(), Some("Core is not from the Workshop"));
    browser.select_next(&mut ctx);
    browser.select_next(&mut ctx);
    browser.open_workshop_page(&mut ctx);
    assert_eq!(
        ctx.speech.last_text(),
        Some("Opened Workshop page for Harmony")
    );
}

#[test]
fn workshop_outage_is_narrated() {
    let mut host = host_selecting(HARMONY);
    host.disable(Capability::Workshop);
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.open_workshop_page(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(speech.last_text(), Some("Workshop is unavailable"));
    assert!(browser.is_active());
}

#[test]
fn upload_checks_preconditions_in_order() {
    let mut host = host_selecting(HARMONY);
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.upload_to_workshop(&mut ModeContext::new(&mut host, &mut speech));
    assert_eq!(
        speech.last_text(),
        Some("Uploading requires development mode")
    );

    host.mods.dev_mode = true;
    host.mods.workshop_ready = false;
    browser.upload_to_workshop(&mut ModeContext::new(&mut host, &mut speech));
    assert_eq!(speech.last_text(), Some("Workshop is not initialized"));

    host.mods.workshop_ready = true;
    browser.upload_to_workshop(&mut ModeContext::new(&mut host, &mut speech));
    assert_eq!(speech.last_text(), Some("Harmony is not a local mod"));
    assert!(host.mods.calls.is_empty());
}

#[test]
fn local_mod_uploads_in_dev_mode() {
    let mut host = host_selecting("MyTestMod");
    host.mods.dev_mode = true;
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    browser.upload_to_workshop(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(
        speech.last_text(),
        Some("Uploading My Test Mod to the Workshop")
    );
    assert_eq!(host.mods.calls, vec!["upload MyTestMod".to_string()]);
}

#[test]
fn confirm_saves_and_cancel_does_not() {
    let mut host = MemoryHost::sample();
    let mut speech = SpeechChannel::silent();

    let mut browser = open(&mut host, &mut speech);
    browser.cancel(&mut ModeContext::new(&mut host, &mut speech));
    assert_eq!(speech.last_text(), Some("Mod list closed"));
    assert_eq!(host.mods.saves, 0);
    assert!(!browser.is_active());

    let mut browser = open(&mut host, &mut speech);
    browser.confirm(&mut ModeContext::new(&mut host, &mut speech));
    assert_eq!(speech.last_text(), Some("Mod list saved"));
    assert_eq!(host.mods.saves, 1);
    assert!(!browser.is_active());
}

#[test]
fn keys_drive_the_browser() {
    let mut host = MemoryHost::sample();
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    let mut ctx = ModeContext::new(&mut host, &mut speech);

    let press = |code, modifiers| KeyEvent::new(code, modifiers);
    assert!(browser.handle_input(&press(KeyCode::Down, KeyModifiers::NONE), &mut ctx));
    assert!(browser.handle_input(&press(KeyCode::Down, KeyModifiers::CONTROL), &mut ctx));
    assert_eq!(browser.index(), 2);
    assert!(browser.handle_input(&press(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut ctx));
    assert!(browser.handle_input(&press(KeyCode::Tab, KeyModifiers::NONE), &mut ctx));
    assert_eq!(browser.column(), ModColumn::Inactive);
    assert!(!browser.handle_input(&press(KeyCode::Char('z'), KeyModifiers::NONE), &mut ctx));
    assert!(!browser.handle_input(&press(KeyCode::Down, KeyModifiers::ALT), &mut ctx));
    assert!(browser.handle_input(&press(KeyCode::Esc, KeyModifiers::NONE), &mut ctx));
    assert!(!browser.is_active());
    assert!(!browser.handle_input(&press(KeyCode::Down, KeyModifiers::NONE), &mut ctx));

    assert_eq!(host.mods.order, vec!["Core", HARMONY, "Royalty", HUGSLIB]);
    assert_eq!(host.mods.saves, 1);
}

#[test]
fn actions_follow_focused_entry_when_filter_shifts_positions() {
    let mut host = host_selecting(HUGSLIB);
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);
    assert_eq!(browser.index(), 3);

    host.mods.filter = Some("h".to_string());
    browser.toggle_selected(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(host.mods.calls, vec![format!("set_enabled {HUGSLIB} false")]);
    assert!(speech
        .last_text()
        .is_some_and(|text| text.starts_with("HugsLib disabled")));
}

#[test]
fn actions_clamp_when_focused_entry_is_filtered_out() {
    let mut host = host_selecting(HUGSLIB);
    let mut speech = SpeechChannel::silent();
    let mut browser = open(&mut host, &mut speech);

    host.mods.filter = Some("ro".to_string());
    browser.read_info(&mut ModeContext::new(&mut host, &mut speech));

    assert_eq!(browser.index(), 0);
    assert_eq!(host.mods.primary.as_deref(), Some("Royalty"));
    assert!(speech
        .last_text()
        .is_some_and(|text| text.starts_with("Royalty")));
}
