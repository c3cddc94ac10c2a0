// Run locally (from the repo root):
//   cargo +nightly fuzz run fuzz_remap_stubs -- -runs=1000
#![no_main]

use std::sync::mpsc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use veil_classfile::ClassStub;
use veil_hierarchy::StubSet;
use veil_jdk::JdkIndex;
use veil_remap::{remap, AlphabetGenerator, RemapContext, RemapError};

mod utils;

const TIMEOUT: Duration = Duration::from_secs(2);

struct Runner {
    input_tx: mpsc::SyncSender<Vec<ClassStub>>,
    output_rx: Mutex<mpsc::Receiver<()>>,
}

fn runner() -> &'static Runner {
    static RUNNER: OnceLock<Runner> = OnceLock::new();
    RUNNER.get_or_init(|| {
        let (input_tx, input_rx) = mpsc::sync_channel::<Vec<ClassStub>>(0);
        let (output_tx, output_rx) = mpsc::sync_channel::<()>(0);

        std::thread::spawn(move || {
            for stubs in input_rx {
                let program: StubSet = stubs.into_iter().collect();
                let context = RemapContext::new(program, AlphabetGenerator::new())
                    .with_platform(JdkIndex::new());
                // Oracle: arbitrary hierarchies (cycles, missing parents, duplicate
                // members) never panic or hang. Only malformed stubs may fail.
                match remap(context) {
                    Ok(_) | Err(RemapError::Malformed { .. }) => {}
                    Err(err) => panic!("unexpected remap failure: {err}"),
                }
                let _ = output_tx.send(());
            }
        });

        Runner {
            input_tx,
            output_rx: Mutex::new(output_rx),
        }
    })
}

fuzz_target!(|data: &[u8]| {
    let Some(text) = utils::truncate_utf8(data) else {
        return;
    };
    let Ok(stubs) = serde_json::from_str::<Vec<ClassStub>>(text) else {
        return;
    };

    let runner = runner();
    runner
        .input_tx
        .send(stubs)
        .expect("fuzz_remap_stubs worker thread exited");

    match runner
        .output_rx
        .lock()
        .expect("fuzz_remap_stubs worker receiver poisoned")
        .recv_timeout(TIMEOUT)
    {
        Ok(()) => {}
        Err(mpsc::RecvTimeoutError::Timeout) => panic!("fuzz_remap_stubs fuzz target timed out"),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            panic!("fuzz_remap_stubs worker thread panicked")
        }
    }
});
