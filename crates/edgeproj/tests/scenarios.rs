//! End-to-end projection scenarios.

use approx::assert_relative_eq;
use edgeproj::{
    generate, generate_with, CancelToken, LinearIndex, Projection, ProjectionError,
    ProjectionOptions, ProjectionOutput, ProjectionTask, Segment, TriangleSoup, ViewDirection,
};

fn top(angle: f64) -> ProjectionOptions {
    ProjectionOptions {
        angle_threshold: angle,
        ..Default::default()
    }
}

/// Segments with endpoints in a canonical order, sorted, for set comparison.
fn canonical(output: &ProjectionOutput) -> Vec<[f64; 6]> {
    let mut out: Vec<[f64; 6]> = output
        .views
        .iter()
        .flat_map(|v| v.lines.segments().iter())
        .map(|s| {
            let a = [s.start.x, s.start.y, s.start.z];
            let b = [s.end.x, s.end.y, s.end.z];
            let (a, b) = if a <= b { (a, b) } else { (b, a) };
            [a[0], a[1], a[2], b[0], b[1], b[2]]
        })
        .collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap());
    out
}

fn assert_same_segments(a: &ProjectionOutput, b: &ProjectionOutput) {
    let (a, b) = (canonical(a), canonical(b));
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        for k in 0..6 {
            assert_relative_eq!(x[k], y[k], epsilon = 1e-9);
        }
    }
}

fn total_length<'a>(segments: impl IntoIterator<Item = &'a Segment>) -> f64 {
    segments.into_iter().map(Segment::length).sum()
}

fn stacked_boxes() -> Vec<TriangleSoup> {
    vec![
        TriangleSoup::cuboid([0.0, 0.0, 0.0], [4.0, 2.0, 1.0]),
        TriangleSoup::cuboid([1.0, -1.0, 2.0], [3.0, 3.0, 3.0]),
    ]
}

/// A sloped plate passing through the top face of a box at y = 1.
fn pierced_box() -> Vec<TriangleSoup> {
    let plate = TriangleSoup::new(
        vec![
            0.5, -1.0, 0.5, //
            1.5, -1.0, 0.5, //
            1.5, 3.0, 1.5, //
            0.5, 3.0, 1.5,
        ],
        vec![0, 1, 2, 0, 2, 3],
    );
    vec![TriangleSoup::cuboid([0.0, 0.0, 0.0], [2.0, 2.0, 1.0]), plate]
}

/// Stacked boxes next to the pierced box, shifted clear along x.
fn mixed_scene() -> Vec<TriangleSoup> {
    let mut parts = stacked_boxes();
    parts.extend(pierced_box().into_iter().map(|mut part| {
        for x in part.positions.iter_mut().step_by(3) {
            *x += 10.0;
        }
        part
    }));
    parts
}

#[test]
fn unit_cube_from_top_shows_outline() {
    let output = generate(&[TriangleSoup::cuboid([0.0; 3], [1.0; 3])], &top(10.0)).unwrap();
    let lines = &output.views[0].lines;
    assert_eq!(lines.len(), 4);
    assert_relative_eq!(total_length(lines.segments()), 4.0, epsilon = 1e-9);

    let on = |v: f64| v.abs() < 1e-9 || (v - 1.0).abs() < 1e-9;
    for s in lines.segments() {
        // Each outline edge keeps x or y fixed on the unit square boundary.
        assert!(
            (on(s.start.x) && s.start.x == s.end.x) || (on(s.start.y) && s.start.y == s.end.y),
            "{s:?}"
        );
        assert_eq!(s.start.z, 0.0);
    }
}

#[test]
fn separated_boxes_show_both_outlines() {
    let parts = [
        TriangleSoup::cuboid([0.0; 3], [1.0; 3]),
        TriangleSoup::cuboid([3.0, 0.0, 0.0], [4.0, 1.0, 2.0]),
    ];
    let output = generate(&parts, &top(10.0)).unwrap();
    let lines = &output.views[0].lines;
    assert_eq!(lines.len(), 8);
    assert_relative_eq!(total_length(lines.segments()), 8.0, epsilon = 1e-9);
}

#[test]
fn stacked_boxes_hide_lower_edges_under_upper_footprint() {
    let output = generate(&stacked_boxes(), &top(10.0)).unwrap();
    let lines = &output.views[0].lines;

    // Upper outline (4) + lower long edges split in two (2 + 2) + lower short edges (2).
    assert_eq!(lines.len(), 10);
    for s in lines.segments() {
        let mid = s.at(0.5);
        let inside = mid.x > 1.0 + 1e-9 && mid.x < 3.0 - 1e-9 && mid.y > -1.0 + 1e-9 && mid.y < 3.0 - 1e-9;
        assert!(!inside, "segment under the upper box: {s:?}");
    }
    // 2 * 4 + 2 * 2 upper, 2 * (1 + 1) + 2 * 2 lower.
    assert_relative_eq!(total_length(lines.segments()), 12.0 + 8.0, epsilon = 1e-9);
}

#[test]
fn intersection_edges_add_visible_crease() {
    let on_seam = |s: &&Segment| (s.start.y - 1.0).abs() < 1e-9 && (s.end.y - 1.0).abs() < 1e-9;

    let with = generate(&pierced_box(), &top(50.0)).unwrap();
    let seam: f64 = total_length(with.views[0].lines.segments().iter().filter(on_seam));
    assert_relative_eq!(seam, 1.0, epsilon = 1e-9);

    let options = ProjectionOptions {
        include_intersection_edges: false,
        ..top(50.0)
    };
    let without = generate(&pierced_box(), &options).unwrap();
    assert_eq!(without.views[0].lines.segments().iter().filter(on_seam).count(), 0);
}

#[test]
fn cancellation_yields_aborted() {
    let token = CancelToken::new();
    let options = ProjectionOptions {
        iteration_time_ms: 0,
        ..Default::default()
    };
    let mut calls = 0;
    let result = generate_with(&stacked_boxes(), &options, &token, |_, _| {
        calls += 1;
        token.cancel();
    });
    assert!(matches!(result, Err(ProjectionError::Aborted)));
    assert_eq!(calls, 1);
}

#[test]
fn sorting_does_not_change_result() {
    let parts = mixed_scene();
    let sorted = generate(&parts, &top(30.0)).unwrap();
    let unsorted = generate(
        &parts,
        &ProjectionOptions {
            sort_edges: false,
            ..top(30.0)
        },
    )
    .unwrap();
    assert_eq!(canonical(&sorted), canonical(&unsorted));
}

#[test]
fn bvh_and_linear_index_agree() {
    let parts = mixed_scene();
    let options = ProjectionOptions {
        projection: Projection::AllViews,
        ..Default::default()
    };

    let bvh = generate(&parts, &options).unwrap();
    let linear = ProjectionTask::<LinearIndex>::with_index(&parts, options)
        .unwrap()
        .finish(|_, _| {})
        .unwrap();
    assert_same_segments(&bvh, &linear);
}

#[test]
fn repeated_runs_are_identical() {
    let parts = pierced_box();
    let a = generate(&parts, &ProjectionOptions::default()).unwrap();
    let b = generate(&parts, &ProjectionOptions::default()).unwrap();
    assert_eq!(a.views[0].lines, b.views[0].lines);
}

#[test]
fn all_views_produce_six_projections() {
    let options = ProjectionOptions {
        projection: Projection::AllViews,
        ..Default::default()
    };
    let output = generate(&stacked_boxes(), &options).unwrap();
    assert_eq!(output.views.len(), 6);
    for (view, expected) in output.views.iter().zip(ViewDirection::ALL) {
        assert_eq!(view.direction, expected);
        assert!(!view.lines.is_empty());
    }
}

#[test]
fn convex_mesh_stays_inside_silhouette() {
    let mesh = TriangleSoup::cuboid([0.0, 0.0, 0.0], [2.0, 1.0, 0.5]);
    let options = ProjectionOptions {
        projection: Projection::AllViews,
        ..Default::default()
    };
    let output = generate(std::slice::from_ref(&mesh), &options).unwrap();

    for view in &output.views {
        let (mut lo, mut hi) = ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]);
        for i in 0..mesh.vertex_count() {
            let p = view.transform.apply_point(&mesh.vertex(i));
            for k in 0..2 {
                lo[k] = lo[k].min(p[k]);
                hi[k] = hi[k].max(p[k]);
            }
        }
        assert_eq!(view.lines.len(), 4, "{}", view.direction);
        for s in view.lines.segments() {
            for p in [s.start, s.end] {
                for k in 0..2 {
                    assert!(p[k] >= lo[k] - 1e-9 && p[k] <= hi[k] + 1e-9, "{}: {p:?}", view.direction);
                }
            }
        }
    }
}

#[test]
fn malformed_input_is_rejected_before_work() {
    let bad = TriangleSoup::new(vec![0.0; 6], vec![0, 1, 2]);
    assert!(matches!(
        generate(&[bad], &ProjectionOptions::default()),
        Err(ProjectionError::IndexOutOfRange { index: 2, vertex_count: 2 })
    ));
    let ragged = TriangleSoup::non_indexed(vec![0.0; 10]);
    assert!(matches!(
        generate(&[ragged], &ProjectionOptions::default()),
        Err(ProjectionError::PositionStride(10))
    ));
    assert!(matches!(
        generate(&[TriangleSoup::non_indexed(Vec::new())], &ProjectionOptions::default()),
        Err(ProjectionError::EmptyPositions)
    ));
}
