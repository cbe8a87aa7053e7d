//! JoinAggregator (spec §4.7): post-run equivalence-class computation over
//! byte-identical child outputs, and the final report's exact layout.

use fleet_core::HostList;

/// One equivalence class of hosts whose captured output is byte-identical.
pub struct JoinClass {
    pub id: usize,
    pub hosts: Vec<String>,
    pub output: Vec<u8>,
}

/// Classify every host's `Child::output` into equivalence classes, in the
/// order classes first occur in the host list, and record `output_class` on
/// each `Child` (spec §3). Requires every `Child` to have a complete
/// `output` (only true once the `JOIN` merged pipe has hit end-of-file).
pub fn classify(hosts: &mut HostList) -> Vec<JoinClass> {
    let n = hosts.len();
    let names: Vec<String> = (0..n).map(|i| hosts.get(i).unwrap().name().to_string()).collect();
    let outputs: Vec<Vec<u8>> = (0..n)
        .map(|i| {
            hosts
                .get(i)
                .and_then(|h| h.child())
                .and_then(|c| c.output())
                .unwrap_or(&[])
                .to_vec()
        })
        .collect();

    let mut class_of: Vec<Option<usize>> = vec![None; n];
    let mut classes: Vec<JoinClass> = Vec::new();

    for h1 in 0..n {
        if class_of[h1].is_some() {
            continue;
        }
        let id = classes.len();
        class_of[h1] = Some(id);
        let mut members = vec![names[h1].clone()];
        for h2 in (h1 + 1)..n {
            if class_of[h2].is_some() {
                continue;
            }
            if outputs[h2] == outputs[h1] {
                class_of[h2] = Some(id);
                members.push(names[h2].clone());
            }
        }
        classes.push(JoinClass {
            id,
            hosts: members,
            output: outputs[h1].clone(),
        });
    }

    for (i, class_id) in class_of.into_iter().enumerate() {
        if let (Some(id), Some(child)) = (class_id, hosts.get_mut(i).and_then(|h| h.child_mut())) {
            child.set_output_class(id);
        }
    }

    classes
}

/// Render the final report (spec §4.7 Output).
pub fn format_report(classes: &[JoinClass], total: usize) -> String {
    let mut report = format!("finished with {} unique result(s)\n", classes.len());
    for class in classes {
        report.push_str(&format!(
            "hosts ({}/{}): {}\n",
            class.hosts.len(),
            total,
            class.hosts.join(" ")
        ));
        report.push_str(&String::from_utf8_lossy(&class.output));
        if !class.output.ends_with(b"\n") {
            report.push('\n');
        }
        report.push('\n');
    }
    report
}
