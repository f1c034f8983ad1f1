use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;
use svgmap::prelude::*;

/// Integration tests for whole-map scenarios
/// These tests drive the public API the way an embedding application does
#[cfg(test)]
mod integration_tests {
    use super::*;

    fn world_frame() -> GeoViewBox {
        GeoViewBox::new(GeoPoint::new(30.0, -10.0), GeoPoint::new(50.0, 10.0))
    }

    fn random_markers(seed: u64, count: usize) -> Vec<Marker> {
        let frame = world_frame();
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|i| {
                Marker::from_geo(
                    format!("m{}", i),
                    GeoPoint::new(
                        rng.random_range(frame.south()..frame.north()),
                        rng.random_range(frame.west()..frame.east()),
                    ),
                )
            })
            .collect()
    }

    fn world_map(background: bool) -> SvgMap {
        let mut options = MapOptions::default();
        options.clustering.on = true;
        options.clustering.cell_size = 50.0;
        options.clustering.background = background;
        options.clustering.background_threshold = 100;

        MapBuilder::new()
            .id("world")
            .view_box(ViewBox::new(0.0, 0.0, 2000.0, 1000.0))
            .geo_view_box(world_frame())
            .container(1000.0, 500.0)
            .options(options)
            .build()
            .unwrap()
    }

    fn cluster_counts(map: &SvgMap) -> Vec<(i32, usize)> {
        (0..=3)
            .map(|level| {
                let count = map
                    .clustering()
                    .clusters(level)
                    .map(|clusters| clusters.len())
                    .unwrap();
                (level, count)
            })
            .collect()
    }

    /// 500 seeded markers on a 2000x1000 world in a 1000px container
    #[test]
    fn test_end_to_end_clustering() {
        let mut map = world_map(false);
        let positioned = map.load_markers(random_markers(42, 500));
        assert_eq!(positioned, 500);

        let counts = cluster_counts(&map);
        let level0 = counts[0].1;
        let level3 = counts[3].1;
        assert!(level0 <= 500);
        assert!(level0 > 0);
        assert!(level3 >= level0);

        let members: usize = map.clusters().unwrap().iter().map(Cluster::count).sum();
        assert_eq!(members, 500);

        let mut again = world_map(false);
        again.load_markers(random_markers(42, 500));
        assert_eq!(cluster_counts(&again), counts);
    }

    #[test]
    fn test_cluster_counts_grow_with_zoom() {
        let mut map = world_map(false);
        map.load_markers(random_markers(7, 500));
        let counts = cluster_counts(&map);
        for pair in counts.windows(2) {
            assert!(pair[1].1 >= pair[0].1, "{:?}", counts);
        }
    }

    #[test]
    fn test_worker_matches_synchronous() {
        let mut sync = world_map(false);
        sync.load_markers(random_markers(99, 500));

        let mut worker = world_map(true);
        worker.load_markers(random_markers(99, 500));
        assert!(worker.wait_for_clusters(Duration::from_secs(10)));

        assert_eq!(cluster_counts(&worker), cluster_counts(&sync));
        assert_eq!(worker.clusters(), sync.clusters());
    }

    #[test]
    fn test_render_items_track_viewport() {
        let mut map = world_map(false);
        map.load_markers(random_markers(3, 500));

        let total: usize = map.render_items().iter().map(|item| item.count).sum();
        assert_eq!(total, 500);

        map.zoom_in(None);
        map.zoom_in(None);
        map.zoom_in(None);
        assert_eq!(map.zoom_level(), 3);
        let items = map.render_items();
        assert_eq!(items.len(), map.clusters().unwrap().len());
        assert!(map.visible_markers().len() < 500);
    }

    #[test]
    fn test_projection_round_trip_across_frame() {
        let map = world_map(false);
        let converter = map.converter();
        let frame = world_frame();

        for i in 0..=10 {
            for j in 0..=10 {
                let geo = GeoPoint::new(
                    frame.south() + frame.lat_span() * i as f64 / 10.0,
                    frame.west() + frame.lng_span() * j as f64 / 10.0,
                );
                let native = converter.geo_to_native(&geo).unwrap();
                let back = converter.native_to_geo(&native).unwrap();
                assert!((back.lat - geo.lat).abs() < 1e-4);
                assert!((back.lng - geo.lng).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_zoom_limit_rejects_step() {
        let mut map = MapBuilder::new()
            .view_box(ViewBox::new(0.0, 0.0, 1000.0, 1000.0))
            .zoom_limit(-2, 2)
            .build()
            .unwrap();

        assert!(map.zoom_in(None).is_some());
        assert!(map.zoom_in(None).is_some());
        let before = map.view_box();
        assert!(map.zoom_in(None).is_none());
        assert_eq!(map.view_box(), before);
        assert_eq!(map.zoom_level(), 2);

        let widths: Vec<f64> = map
            .viewport()
            .table()
            .iter()
            .map(|level| level.view_box.width)
            .collect();
        assert!(widths.windows(2).all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn test_scroll_limit_clamps_edges() {
        let mut options = MapOptions::default();
        options.scroll.limit = true;
        let mut map = MapBuilder::new()
            .view_box(ViewBox::new(0.0, 0.0, 100.0, 100.0))
            .container(100.0, 100.0)
            .options(options)
            .build()
            .unwrap();

        map.zoom_in(None);
        map.pan_by(-1000.0, 0.0);
        assert_eq!(map.view_box().x, 0.0);
    }

    #[test]
    fn test_registry_with_options_from_json() -> anyhow::Result<()> {
        let options = MapOptions::from_json(
            r#"{"clustering": {"on": true, "background": false}, "zoom": {"limit": [0, 4]}}"#,
        )?;
        let source = SourceMeta::from_svg(
            r#"<svg width="2000" height="1000" geoViewBox="-10 50 10 30"></svg>"#,
        )?;

        let mut registry = MapRegistry::new();
        let index = registry.add(
            MapBuilder::from_source(&source)
                .id("from-svg")
                .container(1000.0, 500.0)
                .options(options)
                .build()?,
        );
        registry.add(world_map(false));

        let map = registry
            .get_mut(index)
            .ok_or_else(|| anyhow::anyhow!("map missing"))?;
        map.load_markers(random_markers(5, 50));
        assert_eq!(map.clustering().cached_levels(), 5);

        assert_eq!(registry.len(), 2);
        assert!(registry.get_by_id("world").is_some());
        registry.remove("world")?;
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.poll_background(), 0);
        Ok(())
    }

    #[test]
    fn test_worker_request_over_json() -> anyhow::Result<()> {
        let mut map = world_map(false);
        map.load_markers(random_markers(11, 200));

        let request = ClusterRequest {
            objects: map
                .markers()
                .iter()
                .filter_map(|marker| {
                    marker.position().map(|point| {
                        svgmap::spatial::ClusterObject::new(marker.id.clone(), point)
                    })
                })
                .collect(),
            cell_size: 50.0,
            map_width: 1000.0,
            zoom_levels: map
                .viewport()
                .table()
                .iter()
                .filter(|level| (0..=3).contains(&level.level))
                .map(|level| (level.level, *level))
                .collect(),
            zoom_level: 0,
            zoom_delta: 2.0,
            svg_view_box: map.viewport().native_view_box(),
            generation: 0,
        };

        let wire = request.to_json()?;
        let task = svgmap::background::ClusterTask::new(ClusterRequest::from_json(&wire)?);
        let responses = svgmap::background::clustering::take_responses(task.execute()?)?;

        assert_eq!(responses[0].zoom_level, 0);
        assert_eq!(
            responses[0].cluster_count(),
            map.clustering().clusters(0).map(|c| c.len()).unwrap_or(0)
        );
        for response in &responses {
            let parsed = ClusterResponse::from_json(&response.to_json()?)?;
            assert_eq!(parsed.zoom_level, response.zoom_level);
            assert!(parsed.clusters.keys().eq(response.clusters.keys()));
            for (key, cell) in &parsed.clusters {
                assert_eq!(cell.markers, response.clusters[key].markers);
            }
        }
        Ok(())
    }
}
