use super::*;
use client_core::FileUpload;
use shared::{
    domain::{NoticeId, SampleDataset, ZoneId},
    error::{ServiceError, ServiceOperation},
    protocol::FileUploadResponse,
};

use crate::drop_zone::ZonePhase;

fn uploads(effects: &[Effect]) -> Vec<FileUpload> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::UploadFile { upload, .. } => Some(upload.clone()),
            _ => None,
        })
        .collect()
}

fn schema_fetches(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::FetchSchema))
        .count()
}

fn csv(name: &str) -> IncomingFile {
    IncomingFile::new(name, b"id,name\n1,A\n".to_vec())
}

#[test]
fn repeated_dragover_creates_one_overlay() {
    let mut controller = Controller::default();

    let first = controller.handle(Event::DragOver(ZoneId::Query));
    let second = controller.handle(Event::DragOver(ZoneId::Query));

    assert_eq!(first, vec![Effect::ShowOverlay(ZoneId::Query)]);
    assert!(second.is_empty());
    let zone = controller.uploads().zone(ZoneId::Query).expect("zone");
    assert!(zone.overlay_present());
    assert!(zone.is_active());
}

#[test]
fn zones_do_not_affect_each_other() {
    let mut controller = Controller::default();
    controller.handle(Event::DragOver(ZoneId::Tables));

    let query = controller.uploads().zone(ZoneId::Query).expect("zone");
    let modal = controller.uploads().zone(ZoneId::Modal).expect("zone");
    assert_eq!(query.phase(), ZonePhase::Inert);
    assert_eq!(modal.phase(), ZonePhase::Inert);
    assert!(!query.overlay_present());
}

#[test]
fn dragleave_over_a_child_keeps_the_overlay() {
    let mut controller = Controller::default();
    controller.handle(Event::DragOver(ZoneId::Tables));

    let effects = controller.handle(Event::DragLeft {
        zone: ZoneId::Tables,
        leave: DragLeave::crossed_child(),
    });
    assert!(effects.is_empty());
    assert!(controller
        .uploads()
        .zone(ZoneId::Tables)
        .expect("zone")
        .is_active());

    let effects = controller.handle(Event::DragLeft {
        zone: ZoneId::Tables,
        leave: DragLeave::exited(),
    });
    assert_eq!(effects, vec![Effect::RemoveOverlay(ZoneId::Tables)]);
    let zone = controller.uploads().zone(ZoneId::Tables).expect("zone");
    assert_eq!(zone.phase(), ZonePhase::Inert);
    assert!(!zone.overlay_present());
}

#[test]
fn leaving_from_the_zone_element_itself_counts_as_exit() {
    let mut controller = Controller::default();
    controller.handle(Event::DragOver(ZoneId::Modal));

    let effects = controller.handle(Event::DragLeft {
        zone: ZoneId::Modal,
        leave: DragLeave {
            target_is_zone: true,
            related_inside_zone: true,
        },
    });
    assert_eq!(effects, vec![Effect::RemoveOverlay(ZoneId::Modal)]);
}

#[test]
fn dropping_two_files_is_rejected_without_upload() {
    let mut controller = Controller::default();
    controller.handle(Event::DragOver(ZoneId::Query));

    let effects = controller.handle(Event::Dropped {
        zone: ZoneId::Query,
        files: vec![csv("a.csv"), csv("b.csv")],
    });

    assert_eq!(
        effects,
        vec![
            Effect::RemoveOverlay(ZoneId::Query),
            Effect::RenderError(
                "Only one file can be uploaded at a time. Please drop a single file.".to_string()
            ),
        ]
    );
    assert_eq!(controller.uploads().uploads_in_flight(), 0);
    assert_eq!(
        controller
            .uploads()
            .zone(ZoneId::Query)
            .expect("zone")
            .phase(),
        ZonePhase::Inert
    );
}

#[test]
fn unsupported_extension_is_rejected() {
    let mut controller = Controller::default();

    for name in ["notes.txt", "report.pdf", "data.csv.bak"] {
        let effects = controller.handle(Event::Dropped {
            zone: ZoneId::Tables,
            files: vec![csv(name)],
        });
        assert_eq!(
            effects,
            vec![Effect::RenderError(
                "Invalid file type. Please upload .csv, .json, or .jsonl files.".to_string()
            )]
        );
    }
    assert!(controller.schema().snapshot().is_empty());
}

#[test]
fn mixed_case_extension_is_accepted() {
    let mut controller = Controller::default();
    controller.handle(Event::DragOver(ZoneId::Query));

    let effects = controller.handle(Event::Dropped {
        zone: ZoneId::Query,
        files: vec![csv("data.CSV")],
    });

    assert_eq!(effects[0], Effect::RemoveOverlay(ZoneId::Query));
    assert_eq!(
        effects[1],
        Effect::UploadFile {
            origin: JobOrigin::Zone(ZoneId::Query),
            upload: FileUpload {
                file_name: "data.CSV".to_string(),
                bytes: b"id,name\n1,A\n".to_vec(),
            },
        }
    );
    assert_eq!(
        controller
            .uploads()
            .zone(ZoneId::Query)
            .expect("zone")
            .phase(),
        ZonePhase::Submitting
    );

    controller.handle(Event::UploadCompleted {
        origin: JobOrigin::Zone(ZoneId::Query),
        result: Ok(FileUploadResponse {
            table_name: "data".to_string(),
            row_count: 1,
            ..FileUploadResponse::default()
        }),
    });
    assert_eq!(
        controller
            .uploads()
            .zone(ZoneId::Query)
            .expect("zone")
            .phase(),
        ZonePhase::Inert
    );
}

#[test]
fn empty_drop_is_a_no_op() {
    let mut controller = Controller::default();
    controller.handle(Event::DragOver(ZoneId::Modal));

    let effects = controller.handle(Event::Dropped {
        zone: ZoneId::Modal,
        files: Vec::new(),
    });
    assert_eq!(effects, vec![Effect::RemoveOverlay(ZoneId::Modal)]);
}

#[test]
fn picker_files_skip_extension_check() {
    let mut controller = Controller::default();

    let effects = controller.handle(Event::FilePicked(csv("notes.txt")));

    assert_eq!(uploads(&effects)[0].file_name, "notes.txt");
    assert_eq!(
        controller
            .uploads()
            .zone(ZoneId::Modal)
            .expect("zone")
            .phase(),
        ZonePhase::Inert
    );
}

#[test]
fn successful_upload_refreshes_schema_once_and_posts_notice() {
    let mut controller = Controller::default();
    controller.handle(Event::FilePicked(csv("users.csv")));

    let effects = controller.handle(Event::UploadCompleted {
        origin: JobOrigin::Picker,
        result: Ok(FileUploadResponse {
            table_name: "users".to_string(),
            row_count: 42,
            ..FileUploadResponse::default()
        }),
    });

    assert_eq!(
        effects,
        vec![
            Effect::ShowNotice {
                id: NoticeId(1),
                message: "Table \"users\" created successfully with 42 rows!".to_string(),
                dismiss_after: DEFAULT_NOTICE_TTL,
            },
            Effect::FetchSchema,
        ]
    );
    assert_eq!(
        controller.handle(Event::NoticeExpired(NoticeId(1))),
        vec![Effect::DismissNotice(NoticeId(1))]
    );
}

#[test]
fn failed_upload_never_refreshes_schema() {
    let mut controller = Controller::default();

    let error_field = controller.handle(Event::UploadCompleted {
        origin: JobOrigin::Picker,
        result: Ok(FileUploadResponse {
            error: Some("Error processing file: empty CSV".to_string()),
            ..FileUploadResponse::default()
        }),
    });
    assert_eq!(schema_fetches(&error_field), 0);
    assert_eq!(
        error_field,
        vec![Effect::RenderError(
            "Error processing file: empty CSV".to_string()
        )]
    );

    let transport = controller.handle(Event::UploadCompleted {
        origin: JobOrigin::Zone(ZoneId::Tables),
        result: Err(ServiceError::new(
            ServiceOperation::UploadFile,
            "connection reset",
        )),
    });
    assert_eq!(schema_fetches(&transport), 0);
    assert_eq!(
        transport,
        vec![Effect::RenderError("connection reset".to_string())]
    );
}

#[test]
fn sample_takes_the_same_path_as_a_dropped_file() {
    let mut controller = Controller::default();

    assert_eq!(
        controller.handle(Event::SampleRequested("products".to_string())),
        vec![Effect::FetchSample(SampleDataset::Products)]
    );
    let from_sample = controller.handle(Event::SampleFetched {
        dataset: SampleDataset::Products,
        result: Ok(b"id,name\n1,A\n".to_vec()),
    });
    let from_drop = controller.handle(Event::Dropped {
        zone: ZoneId::Tables,
        files: vec![csv("products.csv")],
    });

    assert_eq!(uploads(&from_sample), uploads(&from_drop));
    assert_eq!(uploads(&from_sample)[0].file_name, "products.csv");
    assert!(matches!(
        from_sample[0],
        Effect::UploadFile {
            origin: JobOrigin::Sample(SampleDataset::Products),
            ..
        }
    ));
}

#[test]
fn unknown_sample_fails_before_any_request() {
    let mut controller = Controller::default();

    let effects = controller.handle(Event::SampleRequested("orders".to_string()));

    assert_eq!(
        effects,
        vec![Effect::RenderError("Unknown sample type: orders".to_string())]
    );
}

#[test]
fn sample_fetch_failure_is_surfaced() {
    let mut controller = Controller::default();

    let effects = controller.handle(Event::SampleFetched {
        dataset: SampleDataset::Events,
        result: Err(ServiceError::new(
            ServiceOperation::FetchSample,
            "Failed to load sample data",
        )),
    });
    assert_eq!(
        effects,
        vec![Effect::RenderError("Failed to load sample data".to_string())]
    );
    assert_eq!(controller.uploads().uploads_in_flight(), 0);
}

#[test]
fn zone_stays_submitting_until_every_drop_completes() {
    let mut controller = Controller::default();
    for name in ["a.csv", "b.json"] {
        controller.handle(Event::DragOver(ZoneId::Tables));
        controller.handle(Event::Dropped {
            zone: ZoneId::Tables,
            files: vec![csv(name)],
        });
    }
    let zone = |controller: &Controller| {
        controller
            .uploads()
            .zone(ZoneId::Tables)
            .expect("zone")
            .clone()
    };
    assert_eq!(zone(&controller).submissions_in_flight(), 2);

    let completed = |table: &str| Event::UploadCompleted {
        origin: JobOrigin::Zone(ZoneId::Tables),
        result: Ok(FileUploadResponse {
            table_name: table.to_string(),
            row_count: 1,
            ..FileUploadResponse::default()
        }),
    };
    controller.handle(completed("a"));
    assert_eq!(zone(&controller).phase(), ZonePhase::Submitting);

    // Hovering over a busy zone shows the overlay; leaving returns to Submitting.
    controller.handle(Event::DragOver(ZoneId::Tables));
    assert_eq!(zone(&controller).phase(), ZonePhase::Hover);
    controller.handle(Event::DragLeft {
        zone: ZoneId::Tables,
        leave: DragLeave::exited(),
    });
    assert_eq!(zone(&controller).phase(), ZonePhase::Submitting);

    controller.handle(completed("b"));
    assert_eq!(zone(&controller).phase(), ZonePhase::Inert);
    assert_eq!(controller.uploads().uploads_in_flight(), 0);
}
