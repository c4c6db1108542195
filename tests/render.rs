use rf_spectrum_wallpaper::render::{
    render, Color, DisplayMode, Frame, Palette, RenderConfig, RenderError, Trace,
};
use rf_spectrum_wallpaper::sweep::Sample;

const BG: Color = Color::rgb(0, 0, 0);
const TRACE: Color = Color::rgb(0, 200, 0);
const PEAK: Color = Color::rgb(200, 0, 0);
const GRID: Color = Color::rgb(20, 20, 20);

fn config(width: u32, height: u32) -> RenderConfig {
    RenderConfig {
        width,
        height,
        background: BG,
        trace: TRACE,
        peak: PEAK,
        grid: GRID,
        ..RenderConfig::default()
    }
}

fn sweep(points: &[(f64, f32)]) -> Vec<Sample> {
    points.iter().map(|(f, p)| Sample::new(*f, *p)).collect()
}

// first row from the top drawn in the trace or peak color
fn top_of_trace(frame: &Frame, x: u32) -> Option<u32> {
    (0..frame.height()).find(|&y| matches!(frame.pixel(x, y), TRACE | PEAK))
}

#[test]
fn three_sample_example() {
    let samples = sweep(&[(100.0, -80.0), (150.0, -40.0), (200.0, -90.0)]);
    let frame = render(&samples, &config(3, 100)).unwrap();

    assert_eq!((frame.width(), frame.height()), (3, 100));
    assert_eq!(frame.pixel(1, 0), PEAK);
    for x in [0, 2] {
        assert!((0..100).all(|y| frame.pixel(x, y) != PEAK));
    }

    let tops: Vec<u32> = (0..3).map(|x| top_of_trace(&frame, x).unwrap()).collect();
    assert!(tops[1] < tops[0]);
    assert!(tops[1] < tops[2]);
    // bars reach the baseline
    for x in 0..3 {
        assert!(matches!(frame.pixel(x, 99), TRACE | PEAK));
    }
}

#[test]
fn empty_sweep_is_invalid_input() {
    assert!(matches!(
        render(&[], &config(10, 10)),
        Err(RenderError::InvalidInput(_))
    ));
}

#[test]
fn dimensions_follow_config() {
    let samples = sweep(&[(1.0, -50.0), (2.0, -30.0), (3.0, -70.0), (4.0, -20.0)]);
    for (w, h) in [(1, 1), (2, 7), (64, 48), (400, 260), (1280, 720)] {
        for mode in [DisplayMode::Bars, DisplayMode::Glyphs] {
            let cfg = RenderConfig {
                mode,
                ..config(w, h)
            };
            let frame = render(&samples, &cfg).unwrap();
            assert_eq!((frame.width(), frame.height()), (w, h), "{:?}", mode);
        }
    }
}

#[test]
fn rendering_is_deterministic() {
    let samples: Vec<Sample> = (0..500)
        .map(|i| Sample::new(88e6 + i as f64 * 40e3, -70.0 + ((i * 37) % 23) as f32))
        .collect();
    let cfg = RenderConfig {
        palette: Some(Palette::Turbo),
        ..RenderConfig::with_size(640, 400)
    };
    assert_eq!(render(&samples, &cfg).unwrap(), render(&samples, &cfg).unwrap());

    let glyphs = RenderConfig {
        mode: DisplayMode::Glyphs,
        ..cfg
    };
    assert_eq!(
        render(&samples, &glyphs).unwrap(),
        render(&samples, &glyphs).unwrap()
    );
}

#[test]
fn increasing_power_never_drops_the_trace() {
    let samples: Vec<Sample> = (0..37)
        .map(|i| Sample::new(i as f64 * 1e3, -100.0 + i as f32 * 2.5))
        .collect();

    let trace = Trace::compute(&samples, 200, &config(200, 120)).unwrap();
    let rows: Vec<u32> = (0..trace.columns()).map(|x| trace.row(x, 120)).collect();
    assert!(rows.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(rows[0], 119);
    assert_eq!(rows[199], 0);

    let frame = render(&samples, &config(200, 120)).unwrap();
    let tops: Vec<u32> = (0..200).map(|x| top_of_trace(&frame, x).unwrap()).collect();
    assert!(tops.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn flat_sweep_renders_a_flat_trace() {
    let samples = sweep(&[(1.0, -55.0), (2.0, -55.0), (3.0, -55.0), (4.0, -55.0)]);
    let frame = render(&samples, &config(16, 40)).unwrap();

    let tops: Vec<Option<u32>> = (0..16).map(|x| top_of_trace(&frame, x)).collect();
    assert!(tops[0].is_some());
    assert!(tops.iter().all(|t| *t == tops[0]));
    // nothing to single out
    assert!(frame.image().pixels().all(|p| Color(p.0) != PEAK));
}

#[test]
fn every_column_gets_a_value() {
    // far fewer samples than columns
    let samples = sweep(&[(0.0, -90.0), (1e6, -20.0), (2e6, -60.0)]);
    let frame = render(&samples, &config(300, 80)).unwrap();
    for x in 0..300 {
        assert!(top_of_trace(&frame, x).is_some(), "column {} is empty", x);
    }
}

#[test]
fn labelled_frames_keep_the_plot_inside_margins() {
    let samples = sweep(&[(88e6, -60.0), (98e6, -20.0), (108e6, -70.0)]);
    let cfg = RenderConfig {
        label: Color::rgb(0, 0, 255),
        ..config(800, 600)
    };
    let frame = render(&samples, &cfg).unwrap();

    // trace only inside the 100px border
    for (x, y, p) in frame.image().enumerate_pixels() {
        if matches!(Color(p.0), TRACE | PEAK) {
            assert!((100..700).contains(&x) && (100..500).contains(&y), "{x},{y}");
        }
    }
    let labelled = frame
        .image()
        .pixels()
        .filter(|p| Color(p.0) == cfg.label)
        .count();
    assert!(labelled > 0);
}

#[test]
fn glyph_mode_draws_no_bars() {
    let samples: Vec<Sample> = (0..60)
        .map(|i| Sample::new(i as f64, -60.0 + (i % 7) as f32 * 5.0))
        .collect();
    let bars = render(&samples, &config(120, 80)).unwrap();
    let glyphs = render(
        &samples,
        &RenderConfig {
            mode: DisplayMode::Glyphs,
            ..config(120, 80)
        },
    )
    .unwrap();

    let lit = |f: &Frame| f.image().pixels().filter(|p| Color(p.0) == TRACE).count();
    assert!(lit(&glyphs) > 0);
    assert!(lit(&glyphs) < lit(&bars));
}

#[test]
fn caption_lands_in_the_top_right_corner() {
    let samples = sweep(&[(88e6, -60.0), (98e6, -20.0), (108e6, -70.0)]);
    let plain = RenderConfig {
        label: Color::rgb(0, 0, 255),
        title: false,
        ..config(800, 600)
    };
    let captioned = RenderConfig {
        caption: Some("2024-05-31 16:05:22".to_string()),
        ..plain.clone()
    };

    let corner = |cfg: &RenderConfig| {
        render(&samples, cfg)
            .unwrap()
            .image()
            .enumerate_pixels()
            .filter(|(x, y, p)| *x >= 400 && *y < 100 && Color(p.0) == cfg.label)
            .count()
    };
    assert_eq!(corner(&plain), 0);
    assert!(corner(&captioned) > 0);
}
