mod test_citations;
