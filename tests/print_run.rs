use risoprint::{
    InkOffset, PrintCompositor, SeededRng, blend, generate_misregistration, grain::generate_grain,
    stochastic_halftone,
};
use vello_cpu::kurbo::Rect;
use vello_cpu::peniko::Color;

const PAPER_PX: [u8; 4] = [248, 244, 233, 255];

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn full_density() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

#[test]
fn seed_42_fixture_is_pinned() {
    // Reference run: key plate pinned to zero, teal's offset equal to the
    // first three RNG draws remapped by its amplitudes. The literals were
    // produced by stepping the generator by hand; any drift here means
    // the RNG or the remapping formula regressed.
    let map = generate_misregistration(42);
    assert_eq!(map["light_gray"], InkOffset::ZERO);
    assert_eq!(
        map["teal"],
        InkOffset {
            dx: 0.20220750384032726,
            dy: -0.10341888200491667,
            rotation: 0.17623289674520493,
        }
    );
}

#[test]
fn seed_42_teal_dx_matches_manual_rng_stepping() {
    let mut rng = SeededRng::new(42);
    let dx = (rng.next_f64() - 0.5) * 2.0;
    let dy = (rng.next_f64() - 0.5) * 2.0;

    let map = generate_misregistration(42);
    assert_eq!(map["teal"].dx, dx);
    assert_eq!(map["teal"].dy, dy);
}

#[test]
fn misregistration_is_deterministic_and_seed_sensitive() {
    assert_eq!(generate_misregistration(42), generate_misregistration(42));

    let a = generate_misregistration(1);
    let b = generate_misregistration(2);
    assert!(a.iter().any(|(id, off)| off.dx != b[id].dx));
}

#[test]
fn fresh_compositor_composites_to_pure_paper() {
    init_tracing();
    let mut comp = PrintCompositor::new(40, 30, 7).unwrap();
    comp.composite().unwrap();
    assert!(comp.output_rgba8().chunks_exact(4).all(|px| px == PAPER_PX));
}

#[test]
fn overlapping_inks_multiply_in_print_order() {
    init_tracing();
    let (w, h) = (64u32, 64u32);
    let mut comp = PrintCompositor::new(w, h, 42).unwrap();

    // Two large full-density plates around the center: even after their
    // misregistration (at most a few units of drift) the center pixel
    // sits deep inside both.
    for ink_id in ["teal", "blue"] {
        comp.layer(ink_id, |ctx| {
            ctx.set_paint(full_density());
            ctx.fill_rect(&Rect::new(8.0, 8.0, 56.0, 56.0));
        })
        .unwrap();
    }
    comp.composite().unwrap();

    // Hand-run the compositing arithmetic for the center pixel: paper,
    // times teal, times blue, then the grain overlay. The resampling
    // pass may shift interior channels by one count, nothing more.
    let mut expected = PAPER_PX;
    expected = blend::multiply(expected, [0, 131, 138, 255]);
    expected = blend::multiply(expected, [0, 120, 191, 255]);
    let grain = generate_grain(w, h);
    let gi = ((h / 2) * w + w / 2) as usize * 4;
    expected = blend::overlay(expected, [grain[gi], grain[gi + 1], grain[gi + 2], grain[gi + 3]]);

    let got = &comp.output_rgba8()[gi..gi + 4];
    for c in 0..4 {
        assert!(
            (i32::from(got[c]) - i32::from(expected[c])).abs() <= 1,
            "channel {c}: got {} expected {}",
            got[c],
            expected[c]
        );
    }
}

#[test]
fn identical_runs_produce_identical_prints() {
    init_tracing();
    let render = || {
        let mut comp = PrintCompositor::new(96, 72, 1337).unwrap();
        comp.layer("light_gray", |ctx| {
            ctx.set_paint(Color::from_rgba8(255, 255, 255, 120));
            ctx.fill_rect(&Rect::new(24.0, 0.0, 96.0, 72.0));
        })
        .unwrap();
        comp.layer("teal", |ctx| {
            ctx.set_paint(Color::from_rgba8(255, 255, 255, 235));
            ctx.fill_rect(&Rect::new(0.0, 0.0, 24.0, 72.0));
        })
        .unwrap();
        let mut rng = SeededRng::new(1337);
        stochastic_halftone(comp.layer_mut("teal").unwrap(), 6.0, &mut rng).unwrap();
        comp.layer("orange", |ctx| {
            ctx.set_paint(Color::from_rgba8(255, 255, 255, 230));
            ctx.fill_rect(&Rect::new(40.0, 0.0, 44.0, 72.0));
        })
        .unwrap();
        comp.composite().unwrap();
        comp.output_rgba8().to_vec()
    };
    assert_eq!(render(), render());
}

#[test]
fn different_seeds_print_differently() {
    let render = |seed: i32| {
        let mut comp = PrintCompositor::new(48, 48, seed).unwrap();
        comp.layer("orange", |ctx| {
            ctx.set_paint(full_density());
            ctx.fill_rect(&Rect::new(10.0, 10.0, 38.0, 38.0));
        })
        .unwrap();
        comp.composite().unwrap();
        comp.output_rgba8().to_vec()
    };
    // Orange drifts by up to two units either way, so distinct seeds move
    // the plate edge with overwhelming probability.
    assert_ne!(render(1), render(2));
}

#[test]
fn halftoned_plate_survives_the_full_pipeline() {
    init_tracing();
    let mut comp = PrintCompositor::new(64, 64, 11).unwrap();
    comp.layer("teal", |ctx| {
        ctx.set_paint(full_density());
        ctx.fill_rect(&Rect::new(0.0, 0.0, 64.0, 64.0));
    })
    .unwrap();
    let mut rng = SeededRng::new(11);
    stochastic_halftone(comp.layer_mut("teal").unwrap(), 8.0, &mut rng).unwrap();
    comp.composite().unwrap();

    let out = comp.output_rgba8();
    // Dots darken some pixels below paper, gaps leave others at paper
    // modulated only by grain.
    assert!(out.chunks_exact(4).any(|px| px[1] < 200));
    assert!(out.chunks_exact(4).any(|px| px[0] > 220));
}

#[test]
fn resize_then_redraw_matches_fresh_compositor() {
    let draw = |comp: &mut PrintCompositor| {
        comp.layer("blue", |ctx| {
            ctx.set_paint(full_density());
            ctx.fill_rect(&Rect::new(4.0, 4.0, 28.0, 28.0));
        })
        .unwrap();
    };

    let mut resized = PrintCompositor::new(80, 80, 21).unwrap();
    resized.resize(32, 32).unwrap();
    draw(&mut resized);
    resized.composite().unwrap();

    let mut fresh = PrintCompositor::new(32, 32, 21).unwrap();
    draw(&mut fresh);
    fresh.composite().unwrap();

    assert_eq!(resized.output_rgba8(), fresh.output_rgba8());
}
