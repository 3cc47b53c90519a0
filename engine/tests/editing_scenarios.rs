use std::cell::RefCell;
use std::rc::Rc;
use pollster::block_on;
use scene_engine::*;

fn library() -> AssetLibrary {
    AssetLibrary::new()
        .with_font("Poppins")
        .with_font("Roboto")
        .with_image("back.png", 300, 300)
        .with_image("front.png", 200, 100)
}

fn editor_with(config: EditorConfig) -> SceneEditor<MemoryCanvas> {
    let mut editor = SceneEditor::new(config, Rc::new(library()));
    editor.attach(MemoryCanvas::default());
    editor
}

fn editor() -> SceneEditor<MemoryCanvas> {
    editor_with(EditorConfig::default())
}

fn scene(editor: &SceneEditor<MemoryCanvas>) -> SceneSnapshot {
    editor.surface().unwrap().serialize()
}

fn selected_name(editor: &SceneEditor<MemoryCanvas>) -> String {
    editor.selected().unwrap().name().to_string()
}

fn one_text_template(font_size: f64) -> TemplateDescription {
    TemplateDescription {
        width: 1080.0,
        height: 1080.0,
        background: Background::default(),
        objects: vec![TemplateObject {
            kind: ObjectKind::Text,
            name: Some("Template 1".to_string()),
            properties: TemplateProperties { font_size: Some(font_size), ..TemplateProperties::default() },
            content: "Template 1".to_string(),
        }],
    }
}

#[test]
fn undoing_every_edit_returns_to_the_base_state() {
    let mut editor = editor();
    let base = scene(&editor);
    block_on(editor.add_object(NewObject::rectangle(50.0, 50.0, "#00FF00"))).unwrap();
    editor.edit_property(PropertyEdit::Left(12.0));
    block_on(editor.add_object(NewObject::text("Hello"))).unwrap();
    editor.edit_property(PropertyEdit::Fill("#123456".to_string()));
    editor.delete();
    editor.set_background_color("#000000");

    for _ in 0..6 {
        assert_eq!(block_on(editor.undo()), EditOutcome::Applied);
    }
    assert_eq!(scene(&editor), base);
    assert!(!editor.can_undo());
    assert_eq!(block_on(editor.undo()), EditOutcome::Skipped);
    assert!(editor.objects().is_empty());
}

#[test]
fn undo_then_redo_restores_the_same_snapshot() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    editor.apply_tint("#FF0000", Some(0.4));
    editor.edit_property(PropertyEdit::Angle(30.0));
    let before = scene(&editor);

    block_on(editor.undo());
    assert_ne!(scene(&editor), before);
    block_on(editor.redo());
    assert_eq!(scene(&editor), before);
    assert!(!editor.can_redo());
}

#[test]
fn an_edit_after_undo_clears_redo() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::rectangle(50.0, 50.0, "#00FF00"))).unwrap();
    editor.edit_property(PropertyEdit::Top(5.0));
    block_on(editor.undo());
    assert!(editor.can_redo());
    editor.edit_property(PropertyEdit::Top(9.0));
    assert!(!editor.can_redo());
    assert_eq!(block_on(editor.redo()), EditOutcome::Skipped);
}

#[test]
fn restoring_is_not_recorded_as_an_edit() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::rectangle(50.0, 50.0, "#00FF00"))).unwrap();
    editor.edit_property(PropertyEdit::Left(1.0));
    assert_eq!(editor.history().undo_len(), 3);
    block_on(editor.undo());
    assert_eq!(editor.history().undo_len(), 2);
    assert_eq!(editor.history().redo_len(), 1);
}

#[test]
fn undo_reselects_the_previous_selection() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::rectangle(50.0, 50.0, "#00FF00"))).unwrap();
    let name = selected_name(&editor);
    editor.edit_property(PropertyEdit::Left(100.0));
    block_on(editor.undo());
    assert_eq!(selected_name(&editor), name);
    assert_ne!(editor.selected().unwrap().common().left, 100.0);

    // Undoing the creation leaves nothing to select.
    block_on(editor.undo());
    assert!(editor.selected().is_none());
}

#[test]
fn template_load_is_the_base_state() {
    let mut editor = editor();
    block_on(editor.load_template(&one_text_template(64.0)));
    assert!(!editor.can_undo());
    editor.select("Template 1");
    assert!(!editor.can_undo());
    editor.edit_property(PropertyEdit::Text("Changed".to_string()));
    assert!(editor.can_undo());
}

#[test]
fn font_size_edit_round_trips_through_history() {
    let mut editor = editor();
    block_on(editor.load_template(&one_text_template(64.0)));
    assert!(!editor.can_undo());
    editor.select("Template 1");

    editor.edit_property(PropertyEdit::FontSize(72.0));
    assert!(editor.can_undo());
    assert_eq!(editor.history().undo_len(), 2);

    block_on(editor.undo());
    assert_eq!(editor.selected().and_then(|p| p.as_text()).unwrap().font_size, 64.0);
    assert!(editor.can_redo());

    block_on(editor.redo());
    assert_eq!(editor.selected().and_then(|p| p.as_text()).unwrap().font_size, 72.0);
    assert!(!editor.can_redo());
}

#[test]
fn history_is_bounded() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::rectangle(50.0, 50.0, "#00FF00"))).unwrap();
    for i in 1..=30 {
        editor.edit_property(PropertyEdit::Left(i as f64));
    }
    assert_eq!(editor.history().undo_len(), 25);

    let mut undone = 0;
    while editor.can_undo() {
        block_on(editor.undo());
        undone += 1;
    }
    assert_eq!(undone, 24);
    // The oldest snapshots were evicted; the creation can no longer be undone.
    assert_eq!(editor.selected().unwrap().common().left, 6.0);
    assert_eq!(editor.objects().len(), 1);
}

#[test]
fn pasting_twice_offsets_each_copy() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::rectangle(50.0, 50.0, "#00FF00"))).unwrap();
    let original = editor.selected().unwrap().common().position();
    assert_eq!(editor.copy(), EditOutcome::Applied);
    editor.paste();
    let first = editor.selected().unwrap().common().clone();
    editor.paste();
    let second = editor.selected().unwrap().common().clone();

    assert_eq!(editor.objects().len(), 3);
    assert_ne!(first.name, second.name);
    assert_eq!(first.position(), original + kurbo::Vec2::new(10.0, 10.0));
    assert_eq!(second.position(), first.position() + kurbo::Vec2::new(10.0, 10.0));
}

#[test]
fn duplicate_selects_the_copy() {
    let mut editor = editor();
    assert_eq!(editor.duplicate(), EditOutcome::Skipped);
    block_on(editor.add_object(NewObject::text("Hello"))).unwrap();
    let original = selected_name(&editor);
    assert_eq!(editor.duplicate(), EditOutcome::Applied);
    assert_ne!(selected_name(&editor), original);
    assert_eq!(editor.objects().len(), 2);
}

#[test]
fn tinting_twice_replaces_in_place() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    let name = selected_name(&editor);
    let chain_len = |editor: &SceneEditor<MemoryCanvas>| editor.selected().and_then(|p| p.as_image()).unwrap().filters.len();

    assert_eq!(chain_len(&editor), 0);
    editor.apply_tint("#FF0000", Some(0.3));
    assert_eq!(chain_len(&editor), 1);
    editor.apply_tint("#0000FF", Some(0.8));
    assert_eq!(chain_len(&editor), 1);

    let query = editor.query_filter(&name, FilterKind::Tint);
    assert!(query.active);
    let descriptor = query.descriptor.unwrap();
    assert_eq!(descriptor.index, 0);
    assert_eq!(descriptor.spec, FilterSpec::Tint { color: "#0000FF".to_string(), opacity: 0.8 });
}

#[test]
fn mask_needs_an_image_behind() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::rectangle(500.0, 500.0, "#00FF00"))).unwrap();
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    let name = selected_name(&editor);
    let before = editor.history().undo_len();

    assert!(matches!(editor.apply_mask(), Err(EditorError::MaskSource { .. })));
    assert!(!editor.query_filter(&name, FilterKind::Mask).active);
    assert!(matches!(editor.take_warnings().as_slice(), [Warning::MaskSource { .. }]));
    assert_eq!(editor.history().undo_len(), before);
}

#[test]
fn mask_uses_the_image_directly_behind() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::image("back.png"))).unwrap();
    let back = selected_name(&editor);
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    let front = selected_name(&editor);

    editor.apply_tint("#FF0000", None);
    assert_eq!(editor.apply_mask().unwrap(), EditOutcome::Applied);
    let mask = editor.query_filter(&front, FilterKind::Mask).descriptor.unwrap();
    assert_eq!(mask.index, 1);
    assert_eq!(mask.spec, FilterSpec::Mask { source: back, src: "back.png".to_string() });
}

#[test]
fn removed_filters_leave_stable_indices() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::image("back.png"))).unwrap();
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    let front = selected_name(&editor);
    editor.apply_tint("#FF0000", None);
    editor.apply_mask().unwrap();

    assert_eq!(editor.remove_filter(FilterKind::Tint), EditOutcome::Applied);
    assert_eq!(editor.remove_filter(FilterKind::Tint), EditOutcome::Skipped);
    let filters = editor.selected().and_then(|p| p.as_image()).unwrap().filters.clone();
    assert_eq!(filters.len(), 2);
    assert!(filters[0].is_none());
    assert_eq!(editor.query_filter(&front, FilterKind::Mask).descriptor.unwrap().index, 1);

    // A new tint goes to the end of the chain.
    editor.apply_tint("#00FF00", None);
    assert_eq!(editor.query_filter(&front, FilterKind::Tint).descriptor.unwrap().index, 2);
}

#[test]
fn filter_queries_follow_history() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    let name = selected_name(&editor);
    editor.apply_tint("#FF0000", None);
    assert!(editor.query_filter(&name, FilterKind::Tint).active);
    block_on(editor.undo());
    assert!(!editor.query_filter(&name, FilterKind::Tint).active);
    block_on(editor.redo());
    assert!(editor.query_filter(&name, FilterKind::Tint).active);
}

#[test]
fn reorder_updates_indices() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::rectangle(10.0, 10.0, "#000000"))).unwrap();
    let bottom = selected_name(&editor);
    block_on(editor.add_object(NewObject::rectangle(10.0, 10.0, "#FFFFFF"))).unwrap();
    let top = selected_name(&editor);

    assert_eq!(editor.reorder(LayerOp::ToBack), EditOutcome::Applied);
    let order: Vec<_> = editor.objects().iter().map(|o| (o.name.clone(), o.index)).collect();
    assert_eq!(order, [(top, 0), (bottom, 1)]);
    assert!(editor.can_undo());
}

#[test]
fn operations_without_selection_are_no_ops() {
    let mut editor = editor();
    let before = editor.history().undo_len();
    assert_eq!(editor.copy(), EditOutcome::Skipped);
    assert_eq!(editor.paste(), EditOutcome::Skipped);
    assert_eq!(editor.delete(), EditOutcome::Skipped);
    assert_eq!(editor.reorder(LayerOp::ToFront), EditOutcome::Skipped);
    assert_eq!(editor.apply_tint("#FF0000", None), EditOutcome::Skipped);
    assert_eq!(editor.apply_mask().unwrap(), EditOutcome::Skipped);
    assert_eq!(editor.remove_filter(FilterKind::Mask), EditOutcome::Skipped);
    assert_eq!(editor.history().undo_len(), before);
}

#[test]
fn detached_editor_ignores_history_navigation() {
    let mut editor: SceneEditor<MemoryCanvas> = SceneEditor::new(EditorConfig::default(), Rc::new(library()));
    assert_eq!(block_on(editor.undo()), EditOutcome::Skipped);
    assert_eq!(block_on(editor.redo()), EditOutcome::Skipped);
    assert_eq!(block_on(editor.add_object(NewObject::text("x"))).unwrap(), EditOutcome::Skipped);
    assert!(!editor.can_undo());
}

#[test]
fn stale_async_edit_does_not_touch_the_new_selection() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::text("One"))).unwrap();
    let pending = editor.begin_font_family("Roboto").unwrap();
    block_on(editor.add_object(NewObject::text("Two"))).unwrap();
    let two = selected_name(&editor);

    let resolved = block_on(pending.resolve());
    assert_eq!(editor.finish_edit(resolved).unwrap(), EditOutcome::Stale);
    let fonts: Vec<String> = scene(&editor).objects.iter().filter_map(|o| o.as_text()).map(|t| t.font_family.clone()).collect();
    assert_eq!(fonts, ["Poppins", "Poppins"]);
    assert_eq!(selected_name(&editor), two);
}

#[test]
fn renaming_rejects_duplicates_and_carries_filters() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::image("back.png"))).unwrap();
    let back = selected_name(&editor);
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    let front = selected_name(&editor);
    editor.apply_tint("#FF0000", None);

    assert_eq!(editor.rename_object(&front, &back), Err(EditorError::DuplicateName(back.clone())));
    assert_eq!(editor.rename_object(&front, &front), Ok(EditOutcome::Skipped));
    assert_eq!(editor.rename_object("ghost", "x"), Err(EditorError::UnknownObject("ghost".to_string())));

    assert_eq!(editor.rename_object(&front, "hero"), Ok(EditOutcome::Applied));
    assert_eq!(selected_name(&editor), "hero");
    assert!(editor.query_filter("hero", FilterKind::Tint).active);
    assert!(!editor.query_filter(&front, FilterKind::Tint).active);
}

#[test]
fn observers_see_every_change() {
    let mut editor = editor();
    let seen: Rc<RefCell<Vec<EditorView>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let id = editor.subscribe(move |view| sink.borrow_mut().push(view.clone()));

    block_on(editor.add_object(NewObject::rectangle(10.0, 10.0, "#000000"))).unwrap();
    let last = seen.borrow().last().cloned().unwrap();
    assert_eq!(last.objects.len(), 1);
    assert!(last.can_undo);
    assert!(last.selected.is_some());

    assert!(editor.unsubscribe(id));
    let count = seen.borrow().len();
    editor.delete();
    assert_eq!(seen.borrow().len(), count);
    assert!(!editor.unsubscribe(id));
}

#[test]
fn interactive_drags_are_committed_through_dispatch() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::rectangle(10.0, 10.0, "#000000"))).unwrap();
    let name = selected_name(&editor);
    let before = editor.history().undo_len();
    editor.surface_mut().unwrap().drag(&name, kurbo::Vec2::new(5.0, 0.0));
    editor.flush_events();
    assert_eq!(editor.history().undo_len(), before + 1);
    block_on(editor.undo());
    assert_eq!(editor.history().undo_len(), before);
}

#[test]
fn config_limits_apply() {
    let config = EditorConfig::from_json(r#"{ "history_limit": 3, "paste_offset": 25 }"#).unwrap();
    let mut editor = editor_with(config);
    block_on(editor.add_object(NewObject::rectangle(10.0, 10.0, "#000000"))).unwrap();
    let start = editor.selected().unwrap().common().position();
    editor.duplicate();
    assert_eq!(editor.selected().unwrap().common().position(), start + kurbo::Vec2::new(25.0, 25.0));
    for i in 0..5 {
        editor.edit_property(PropertyEdit::Top(i as f64));
    }
    assert_eq!(editor.history().undo_len(), 3);
}

#[test]
fn snapshots_export_as_json() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    editor.apply_tint("#FF0000", Some(0.5));
    let snapshot = scene(&editor);
    let json = snapshot.to_json().unwrap();
    assert_eq!(SceneSnapshot::from_json(&json).unwrap(), snapshot);
}

#[test]
fn layered_documents_load_as_templates() {
    let mut editor = editor();
    let layers = vec![scene_engine::layers::DocumentLayer {
        name: Some("Headline".to_string()),
        right: 300.0,
        bottom: 80.0,
        text: Some(scene_engine::layers::TextLayer { text: "Sale".to_string(), style: Default::default() }),
        ..Default::default()
    }];
    let template = scene_engine::layers::template_from_layers(800.0, 600.0, &layers);
    block_on(editor.load_template(&template));
    let headline = editor.surface().unwrap().object("Headline").unwrap();
    let text = headline.as_text().unwrap();
    assert_eq!(text.font_family, "Poppins");
    assert_eq!(text.font_size, 32.0);
    assert_eq!(text.common.width, 300.0);
    assert!(!editor.can_undo());
}

#[test]
fn squashing_text_keeps_a_positive_font_size() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::text("Tiny"))).unwrap();
    let name = selected_name(&editor);
    editor.surface_mut().unwrap().scale(&name, 1.0, 0.01);
    editor.flush_events();
    assert_eq!(editor.selected().and_then(|p| p.as_text()).unwrap().font_size, 1.0);

    editor.surface_mut().unwrap().scale(&name, 1.0, 20.0);
    editor.flush_events();
    assert_eq!(editor.selected().and_then(|p| p.as_text()).unwrap().font_size, 20.0);
}

#[test]
fn reorder_that_changes_nothing_is_not_recorded() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::rectangle(10.0, 10.0, "#000000"))).unwrap();
    let before = editor.history().undo_len();
    assert_eq!(editor.reorder(LayerOp::ToFront), EditOutcome::Skipped);
    assert_eq!(editor.reorder(LayerOp::Backward), EditOutcome::Skipped);
    assert_eq!(editor.reorder(LayerOp::ToIndex(0)), EditOutcome::Skipped);
    assert_eq!(editor.history().undo_len(), before);

    block_on(editor.add_object(NewObject::rectangle(10.0, 10.0, "#FFFFFF"))).unwrap();
    let before = editor.history().undo_len();
    assert_eq!(editor.reorder(LayerOp::Forward), EditOutcome::Skipped);
    assert_eq!(editor.reorder(LayerOp::Backward), EditOutcome::Applied);
    assert_eq!(editor.history().undo_len(), before + 1);
}

#[test]
fn tint_opacity_is_clamped() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    let name = selected_name(&editor);
    editor.apply_tint("#FF0000", Some(3.0));
    let spec = editor.query_filter(&name, FilterKind::Tint).descriptor.unwrap().spec;
    assert_eq!(spec, FilterSpec::Tint { color: "#FF0000".to_string(), opacity: 1.0 });
    editor.apply_tint("#FF0000", Some(-0.5));
    let spec = editor.query_filter(&name, FilterKind::Tint).descriptor.unwrap().spec;
    assert_eq!(spec, FilterSpec::Tint { color: "#FF0000".to_string(), opacity: 0.0 });
}

#[test]
fn renaming_a_mask_source_updates_the_masked_image() {
    let mut editor = editor();
    block_on(editor.add_object(NewObject::image("back.png"))).unwrap();
    let back = selected_name(&editor);
    block_on(editor.add_object(NewObject::image("front.png"))).unwrap();
    let front = selected_name(&editor);
    editor.apply_mask().unwrap();

    assert_eq!(editor.rename_object(&back, "backdrop"), Ok(EditOutcome::Applied));
    let expected = FilterSpec::Mask { source: "backdrop".to_string(), src: "back.png".to_string() };
    assert_eq!(editor.query_filter(&front, FilterKind::Mask).descriptor.unwrap().spec, expected);
    let chain = editor.surface().unwrap().object(&front).unwrap().as_image().unwrap().filters.clone();
    assert_eq!(chain, [Some(expected)]);

    // The rename is one undo step, mask included.
    block_on(editor.undo());
    let restored = editor.query_filter(&front, FilterKind::Mask).descriptor.unwrap().spec;
    assert_eq!(restored, FilterSpec::Mask { source: back, src: "back.png".to_string() });
}
