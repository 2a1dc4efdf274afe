mod test_build_pipeline;
