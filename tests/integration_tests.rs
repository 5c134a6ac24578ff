use tiny_engine::{
    game::{
        color::Rgb,
        components::{ComponentKind, Sprite, Square},
        math::{Rect2F, Vector2F},
        object::Core,
        script::Script,
        world::World
    },
    input::{Input, KeyCode},
    rendering::{DrawCommand, DrawList},
    EngineError,
    Result
};
use winit::event::ElementState;

struct ArrowMover;

impl Script for ArrowMover {
    fn update(&mut self, core: &mut Core, input: &Input) -> Result<()> {
        if input.get_key("right")? {
            core.transform.position.translate_right();
        }
        if input.get_key("down")? {
            core.transform.position.translate_down();
        }
        if input.get_key_down("space")? {
            core.transform.move_to((0.0, 0.0));
        }
        Ok(())
    }
}

fn drawn_rect(canvas: &DrawList) -> Rect2F {
    match canvas.commands() {
        [DrawCommand::FillRect { rect, .. }] => *rect,
        other => panic!("expected a single rect, got {other:?}"),
    }
}

#[test]
fn test_scripted_object_follows_held_keys_across_frames() {
    let mut world = World::new();
    let mut player = Core::new("Player");
    player.add_component(Square::new(2.0, 2.0, Rgb::BLUE).unwrap());
    player.transform.move_to((10.0, 10.0));
    let id = world.spawn_with_script(player, ArrowMover);
    world.start().unwrap();

    let mut input = Input::new();
    let mut canvas = DrawList::new();

    input.handle_key(KeyCode::ArrowRight, ElementState::Pressed, false);
    for _ in 0..3 {
        canvas.clear();
        world.tick(&input, &mut canvas).unwrap();
        input.end_frame();
    }
    // Third frame draws the position reached after two script updates.
    assert_eq!(drawn_rect(&canvas), Rect2F::new(11.0, 9.0, 2.0, 2.0));
    assert_eq!(world.get(id).unwrap().transform.position, Vector2F::new(13.0, 10.0));

    input.handle_key(KeyCode::ArrowRight, ElementState::Released, false);
    input.handle_key(KeyCode::ArrowDown, ElementState::Pressed, false);
    canvas.clear();
    world.tick(&input, &mut canvas).unwrap();
    input.end_frame();
    assert_eq!(world.get(id).unwrap().transform.position, Vector2F::new(13.0, 11.0));
}

#[test]
fn test_key_down_fires_once_per_press() {
    let mut world = World::new();
    let id = world.spawn_with_script(Core::new("Player"), ArrowMover);

    let mut input = Input::new();
    let mut canvas = DrawList::new();

    world.get_mut(id).unwrap().transform.move_to((5.0, 5.0));
    input.handle_key(KeyCode::Space, ElementState::Pressed, false);
    world.tick(&input, &mut canvas).unwrap();
    input.end_frame();
    assert_eq!(world.get(id).unwrap().transform.position, Vector2F::zero());

    // Still held on the next frame, no new edge.
    world.get_mut(id).unwrap().transform.move_to((5.0, 5.0));
    world.tick(&input, &mut canvas).unwrap();
    assert_eq!(world.get(id).unwrap().transform.position, Vector2F::new(5.0, 5.0));
}

#[test]
fn test_sprite_from_art_dir_is_drawn_centered() {
    let art_dir = tempfile::tempdir().unwrap();
    image::RgbaImage::from_pixel(8, 4, image::Rgba([200, 10, 10, 255]))
        .save(art_dir.path().join("ship.png"))
        .unwrap();

    let mut ship = Core::new("Ship");
    ship.transform.move_to((100.0, 100.0));
    ship.add_component(Sprite::load(art_dir.path(), "ship.png", 2.0).unwrap());

    let mut world = World::new();
    world.spawn(ship);

    let mut canvas = DrawList::new();
    world.tick(&Input::new(), &mut canvas).unwrap();

    match canvas.commands() {
        [DrawCommand::Blit { image, position }] => {
            assert_eq!((image.width(), image.height()), (16, 8));
            assert_eq!(*position, Vector2F::new(92.0, 96.0));
        },
        other => panic!("expected a single blit, got {other:?}"),
    }
}

#[test]
fn test_missing_sprite_is_recoverable() {
    let art_dir = tempfile::tempdir().unwrap();
    let mut core = Core::new("Fallback");

    match Sprite::load(art_dir.path(), "nope.png", 1.0) {
        Ok(_) => panic!("sprite should not load"),
        Err(EngineError::ResourceLoad { .. }) => {
            core.add_component(Square::with_size(1.0, 1.0).unwrap());
        },
        Err(e) => panic!("unexpected error {e}"),
    }

    assert!(core.has_component(ComponentKind::Square));
    assert!(matches!(core.get::<Sprite>(), Err(EngineError::NotFound(ComponentKind::Sprite))));
}

#[test]
fn test_objects_draw_in_spawn_order() {
    let mut world = World::new();
    for (name, x) in [("a", 10.0), ("b", 20.0), ("c", 30.0)] {
        let mut core = Core::new(name);
        core.transform.move_to((x, 0.0));
        core.add_component(Square::with_size(2.0, 2.0).unwrap());
        world.spawn(core);
    }
    let b = world.find_by_name("b").unwrap();
    world.remove(b).unwrap();

    let mut canvas = DrawList::new();
    world.tick(&Input::new(), &mut canvas).unwrap();

    let xs: Vec<f32> = canvas.commands().iter()
        .map(|command| match command {
            DrawCommand::FillRect { rect, .. } => rect.pos.x,
            DrawCommand::Blit { position, .. } => position.x,
        })
        .collect();
    assert_eq!(xs, vec![9.0, 29.0]);
}
