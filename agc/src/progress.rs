use std::fmt::{Debug, Display, Formatter};

/// Long-running stage of a clustering run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProgressStage {
    /// Reading and dereplicating the input sequences; one iteration per
    /// sequence read.
    Reading,
    /// Clustering the dereplicated records; one iteration per record.
    Clustering,
}

impl ProgressStage {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ProgressStage::Reading => "Reading sequences",
            ProgressStage::Clustering => "Clustering",
        }
    }
}

impl Display for ProgressStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Receiver of progress updates of long-running operations.
pub trait ProgressNotifier: Debug + Send + Sync {
    /// Starts given stage. `num_iter` is the total number of iterations of
    /// the stage, or `None` if it is not known upfront.
    fn start_stage(&self, stage: ProgressStage, num_iter: Option<u64>);

    fn inc_iter(&self);
}

impl<T: ProgressNotifier> ProgressNotifier for &T {
    fn start_stage(&self, stage: ProgressStage, num_iter: Option<u64>) {
        T::start_stage(self, stage, num_iter)
    }

    fn inc_iter(&self) {
        T::inc_iter(self)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct DummyProgressNotifier;

impl ProgressNotifier for DummyProgressNotifier {
    fn start_stage(&self, _stage: ProgressStage, _num_iter: Option<u64>) {
        // do nothing
    }

    fn inc_iter(&self) {
        // do nothing
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use crate::progress::{DummyProgressNotifier, ProgressNotifier, ProgressStage};

    /// Notifier recording the stages started along with the number of
    /// iterations reported in each of them.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingNotifier {
        stages: Mutex<Vec<(ProgressStage, Option<u64>, u64)>>,
    }

    impl RecordingNotifier {
        pub(crate) fn stages(&self) -> Vec<(ProgressStage, Option<u64>, u64)> {
            self.stages.lock().unwrap().clone()
        }
    }

    impl ProgressNotifier for RecordingNotifier {
        fn start_stage(&self, stage: ProgressStage, num_iter: Option<u64>) {
            self.stages.lock().unwrap().push((stage, num_iter, 0));
        }

        fn inc_iter(&self) {
            let mut stages = self.stages.lock().unwrap();
            let current = stages.last_mut().expect("no stage started");
            current.2 += 1;
        }
    }

    #[test]
    fn test_dummy_progress_notifier() {
        let notifier = DummyProgressNotifier;
        notifier.start_stage(ProgressStage::Reading, None);
        let notifier_2 = notifier;
        notifier_2.inc_iter();
    }

    #[test]
    fn test_notifier_reference() {
        let notifier = RecordingNotifier::default();
        {
            let by_ref = &notifier;
            ProgressNotifier::start_stage(&by_ref, ProgressStage::Clustering, Some(3));
            ProgressNotifier::inc_iter(&by_ref);
            ProgressNotifier::inc_iter(&by_ref);
        }

        assert_eq!(
            notifier.stages(),
            [(ProgressStage::Clustering, Some(3), 2)]
        );
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ProgressStage::Reading.to_string(), "Reading sequences");
        assert_eq!(ProgressStage::Clustering.to_string(), "Clustering");
    }
}
