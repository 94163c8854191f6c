//! Shared replay fixtures for the integration suites.
//!
//! The EMAP fragment mirrors the shape of the mouse-anatomy ontology around
//! the heart (`EMAP:3018`) and arterial system (`EMAP:3003`) branches:
//!
//! ```text
//! EMAP:0
//! └── EMAP:2636
//!     ├── EMAP:2822 ── EMAP:2987 ── EMAP:3018 ── {3022, 3023, 3024} ── ...
//!     └── EMAP:3003 ── {3004, 3005, 3006} ── ...
//! ```
//!
//! Focused on `EMAP:3018` the graph holds 19 terms; merging in the focused
//! `EMAP:3003` branch (15 new terms) grows it to 34.

#![allow(dead_code)]

use std::rc::Rc;

use ontolook::remote::replay::ReplayRemote;

pub fn emap_remote() -> Rc<ReplayRemote> {
    let mut remote = ReplayRemote::new("1.4");
    remote.add_ontology("EMAP", "Mouse gross anatomy and development");
    remote.add_ontology("GO", "Gene Ontology");

    let terms = [
        ("EMAP:0", "Mouse_anatomy_by_time_xproduct"),
        ("EMAP:2636", "TS19,embryo"),
        ("EMAP:2822", "TS19,organ system"),
        ("EMAP:2987", "TS19,cardiovascular system"),
        ("EMAP:3018", "TS19,heart"),
        ("EMAP:3022", "TS19,atrium,heart"),
        ("EMAP:3023", "TS19,outflow tract,heart"),
        ("EMAP:3024", "TS19,ventricle,heart"),
        ("EMAP:3025", "TS19,common atrial chamber"),
        ("EMAP:3026", "TS19,left atrium"),
        ("EMAP:3027", "TS19,right atrium"),
        ("EMAP:3028", "TS19,valve,atrium"),
        ("EMAP:3029", "TS19,aortic sac"),
        ("EMAP:3030", "TS19,conotruncus"),
        ("EMAP:3031", "TS19,truncus arteriosus"),
        ("EMAP:3032", "TS19,bulbus cordis"),
        ("EMAP:3033", "TS19,common ventricular chamber"),
        ("EMAP:3034", "TS19,left ventricle"),
        ("EMAP:3035", "TS19,right ventricle"),
        ("EMAP:3003", "TS19,arterial system"),
        ("EMAP:3004", "TS19,aorta"),
        ("EMAP:3005", "TS19,aortic arch arteries"),
        ("EMAP:3006", "TS19,pulmonary artery"),
        ("EMAP:3007", "TS19,dorsal aorta"),
        ("EMAP:3008", "TS19,ascending aorta"),
        ("EMAP:3009", "TS19,descending aorta"),
        ("EMAP:3010", "TS19,1st arch artery"),
        ("EMAP:3011", "TS19,2nd arch artery"),
        ("EMAP:3012", "TS19,3rd arch artery"),
        ("EMAP:3013", "TS19,left pulmonary artery"),
        ("EMAP:3014", "TS19,right pulmonary artery"),
        ("EMAP:3015", "TS19,thoracic aorta"),
        ("EMAP:3016", "TS19,abdominal aorta"),
        ("EMAP:3017", "TS19,umbilical artery"),
    ];
    for (id, name) in terms {
        remote.add_term(id, name);
    }

    let edges = [
        // Heart branch: ancestors of EMAP:3018 plus its 14 descendants.
        ("EMAP:0", "EMAP:2636"),
        ("EMAP:2636", "EMAP:2822"),
        ("EMAP:2822", "EMAP:2987"),
        ("EMAP:2987", "EMAP:3018"),
        ("EMAP:3018", "EMAP:3022"),
        ("EMAP:3018", "EMAP:3023"),
        ("EMAP:3018", "EMAP:3024"),
        ("EMAP:3022", "EMAP:3025"),
        ("EMAP:3022", "EMAP:3026"),
        ("EMAP:3022", "EMAP:3027"),
        ("EMAP:3022", "EMAP:3028"),
        ("EMAP:3023", "EMAP:3029"),
        ("EMAP:3023", "EMAP:3030"),
        ("EMAP:3023", "EMAP:3031"),
        ("EMAP:3023", "EMAP:3032"),
        ("EMAP:3024", "EMAP:3033"),
        ("EMAP:3024", "EMAP:3034"),
        ("EMAP:3024", "EMAP:3035"),
        // Arterial branch: EMAP:3003 plus its 14 descendants.
        ("EMAP:2636", "EMAP:3003"),
        ("EMAP:3003", "EMAP:3004"),
        ("EMAP:3003", "EMAP:3005"),
        ("EMAP:3003", "EMAP:3006"),
        ("EMAP:3004", "EMAP:3007"),
        ("EMAP:3004", "EMAP:3008"),
        ("EMAP:3004", "EMAP:3009"),
        ("EMAP:3005", "EMAP:3010"),
        ("EMAP:3005", "EMAP:3011"),
        ("EMAP:3005", "EMAP:3012"),
        ("EMAP:3006", "EMAP:3013"),
        ("EMAP:3006", "EMAP:3014"),
        ("EMAP:3007", "EMAP:3015"),
        ("EMAP:3007", "EMAP:3016"),
        ("EMAP:3007", "EMAP:3017"),
    ];
    for (parent, child) in edges {
        remote.add_edge(parent, child);
    }
    remote.add_root("EMAP", "EMAP:0");

    remote.set_metadata(
        "EMAP:3018",
        vec![
            (
                "definition".to_owned(),
                "The hollow muscular organ that pumps blood through the embryo.".to_owned(),
            ),
            ("exact_synonym".to_owned(), "embryonic heart".to_owned()),
            ("related_synonym".to_owned(), "cardiac primordium".to_owned()),
        ],
    );
    remote.set_obsolete("EMAP:3031", true);

    // GO roots, enough to answer the root-terms query.
    for (id, name) in [
        ("GO:0008150", "biological_process"),
        ("GO:0005575", "cellular_component"),
        ("GO:0003674", "molecular_function"),
    ] {
        remote.add_term(id, name);
        remote.add_root("GO", id);
    }

    Rc::new(remote)
}
